/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Request framing: `[len][cmd][payload..][crc32 le]`, where `len` counts
//! every byte after itself and the CRC covers `len` through the last payload byte.

use super::command::Command;
use super::std_crc::std_crc;

pub const TRAILER_SIZE: usize = core::mem::size_of::<u32>();
/// Smallest legal `len`: the command byte and the trailer
pub const MIN_FRAME_LEN: u8 = 1 + TRAILER_SIZE as u8;
pub const MAX_FRAME_LEN: u8 = 254;
/// Receive buffer that fits any length byte, legal or not
pub const FRAME_BUFFER_SIZE: usize = u8::MAX as usize + 1;

const PAYLOAD_OFFSET: usize = 2;
const ADDRESS_SIZE: usize = core::mem::size_of::<u32>();
/// Largest MEM_WRITE data block that still fits in one frame
pub const MAX_WRITE_DATA: usize =
    MAX_FRAME_LEN as usize - 1 - ADDRESS_SIZE - 1 - TRAILER_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Fewer bytes than the frame or its command layout needs
    Truncated,
    /// `len` above [`MAX_FRAME_LEN`]
    Oversized,
    /// Output buffer cannot hold the encoded frame
    BufferTooSmall,
    UnknownCommand(u8),
}

/// A length-checked frame, borrowed from the receive buffer
#[derive(Clone, Copy)]
pub struct Packet<'a> {
    frame: &'a [u8],
}

impl<'a> Packet<'a> {
    pub fn parse(frame: &'a [u8]) -> Result<Self, FrameError> {
        let (&len, rest) = frame.split_first().ok_or(FrameError::Truncated)?;

        if len > MAX_FRAME_LEN {
            return Err(FrameError::Oversized);
        } else if len < MIN_FRAME_LEN || rest.len() < len as usize {
            return Err(FrameError::Truncated);
        }

        Ok(Self {
            frame: &frame[..=len as usize],
        })
    }

    pub fn command(&self) -> Command {
        Command::from(self.frame[1])
    }

    /// Bytes the trailer is computed over
    pub fn covered(&self) -> &'a [u8] {
        &self.frame[..self.frame.len() - TRAILER_SIZE]
    }

    /// Command specific payload, between the command byte and the trailer
    pub fn payload(&self) -> &'a [u8] {
        &self.frame[PAYLOAD_OFFSET..self.frame.len() - TRAILER_SIZE]
    }

    pub fn trailer(&self) -> u32 {
        let mut raw = [0u8; TRAILER_SIZE];
        raw.copy_from_slice(&self.frame[self.frame.len() - TRAILER_SIZE..]);
        u32::from_le_bytes(raw)
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.frame
    }
}

/// Decoded request, one variant per command layout
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    GetVersion,
    GetHelp,
    GetChipId,
    GoToAddress { address: u32 },
    FlashErase { page: u8, count: u8 },
    MemoryWrite { address: u32, data: &'a [u8] },
    /// Commands with no implemented payload
    Reserved(Command),
}

fn read_u32(payload: &[u8]) -> Result<u32, FrameError> {
    let raw = payload.get(..ADDRESS_SIZE).ok_or(FrameError::Truncated)?;
    let mut word = [0u8; ADDRESS_SIZE];
    word.copy_from_slice(raw);
    Ok(u32::from_le_bytes(word))
}

impl<'a> Request<'a> {
    pub fn decode(packet: &Packet<'a>) -> Result<Self, FrameError> {
        let payload = packet.payload();

        match packet.command() {
            Command::GetVersion => Ok(Self::GetVersion),
            Command::GetHelp => Ok(Self::GetHelp),
            Command::GetChipId => Ok(Self::GetChipId),
            Command::GoToAddress => Ok(Self::GoToAddress {
                address: read_u32(payload)?,
            }),
            Command::FlashErase => match payload {
                [page, count, ..] => Ok(Self::FlashErase {
                    page: *page,
                    count: *count,
                }),
                _ => Err(FrameError::Truncated),
            },
            Command::MemoryWrite => {
                let address = read_u32(payload)?;
                let length = *payload.get(ADDRESS_SIZE).ok_or(FrameError::Truncated)? as usize;
                let start = ADDRESS_SIZE + 1;
                let data = payload
                    .get(start..start + length)
                    .ok_or(FrameError::Truncated)?;
                Ok(Self::MemoryWrite { address, data })
            }
            Command::Unknown(code) => Err(FrameError::UnknownCommand(code)),
            reserved => Ok(Self::Reserved(reserved)),
        }
    }

    pub fn command(&self) -> Command {
        match self {
            Self::GetVersion => Command::GetVersion,
            Self::GetHelp => Command::GetHelp,
            Self::GetChipId => Command::GetChipId,
            Self::GoToAddress { .. } => Command::GoToAddress,
            Self::FlashErase { .. } => Command::FlashErase,
            Self::MemoryWrite { .. } => Command::MemoryWrite,
            Self::Reserved(cmd) => *cmd,
        }
    }

    /// Build a complete frame with its CRC trailer into `buf`, host side.
    /// Returns the frame size.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, FrameError> {
        let mut payload = [0u8; MAX_FRAME_LEN as usize];
        let payload_len = match *self {
            Self::GoToAddress { address } => {
                payload[..ADDRESS_SIZE].copy_from_slice(&address.to_le_bytes());
                ADDRESS_SIZE
            }
            Self::FlashErase { page, count } => {
                payload[0] = page;
                payload[1] = count;
                2
            }
            Self::MemoryWrite { address, data } => {
                if data.len() > MAX_WRITE_DATA {
                    return Err(FrameError::Oversized);
                }
                payload[..ADDRESS_SIZE].copy_from_slice(&address.to_le_bytes());
                payload[ADDRESS_SIZE] = data.len() as u8;
                payload[ADDRESS_SIZE + 1..ADDRESS_SIZE + 1 + data.len()].copy_from_slice(data);
                ADDRESS_SIZE + 1 + data.len()
            }
            Self::Reserved(Command::Unknown(code)) => return Err(FrameError::UnknownCommand(code)),
            _ => 0,
        };

        encode_raw(self.command().code(), &payload[..payload_len], buf)
    }
}

/// Frame an arbitrary command byte and payload, host side
pub fn encode_raw(command: u8, payload: &[u8], buf: &mut [u8]) -> Result<usize, FrameError> {
    let len = 1 + payload.len() + TRAILER_SIZE;
    if len > MAX_FRAME_LEN as usize {
        return Err(FrameError::Oversized);
    }
    let total = len + 1;
    let out = buf.get_mut(..total).ok_or(FrameError::BufferTooSmall)?;

    out[0] = len as u8;
    out[1] = command;
    out[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload.len()].copy_from_slice(payload);
    let crc = std_crc(&out[..total - TRAILER_SIZE]);
    out[total - TRAILER_SIZE..].copy_from_slice(&crc.to_le_bytes());

    Ok(total)
}
