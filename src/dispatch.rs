/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Command dispatcher. One frame in, one response out.
//!
//! Every known command is integrity checked first; a bad trailer gets a NACK
//! and nothing else happens. Unknown command codes get [`INVALID_ID`] whatever
//! their trailer says.

use embedded_hal::digital::OutputPin;
use embedded_io::{Read, Write};

use crate::address::classify;
use crate::flash::{self, FlashController};
use crate::integrity::{verify_packet, CrcUnit, Integrity};
use crate::launch::{Device, JumpTarget};
use crate::types::command::Command;
use crate::types::frame::{Packet, Request};
use crate::types::response::{ack_header, flash_status, AddressStatus, INVALID_ID, NACK};
use crate::types::{BOOTLOADER_VERSION, DEV_ID_MASK};

/// The bootloader proper: a serial link plus the hardware it drives
pub struct Bootloader<L, C, F, P, D> {
    pub(crate) link: L,
    pub(crate) crc: C,
    pub(crate) flash: F,
    pub(crate) strobe: P,
    pub(crate) device: D,
}

impl<L, C, F, P, D> Bootloader<L, C, F, P, D>
where
    L: Read + Write,
    C: CrcUnit,
    F: FlashController,
    P: OutputPin,
    D: Device,
{
    pub fn new(link: L, crc: C, flash: F, strobe: P, device: D) -> Self {
        Self {
            link,
            crc,
            flash,
            strobe,
            device,
        }
    }

    /// Handle one received frame, `frame[0]` being its length byte.
    ///
    /// Only link errors come back; protocol level failures are answered on the link.
    pub fn handle(&mut self, frame: &[u8]) -> Result<(), L::Error> {
        let Some(&code) = frame.get(1) else {
            warn!("frame without command byte");
            return self.nack();
        };

        if let Command::Unknown(code) = Command::from(code) {
            warn!("unknown command {:#x}", code);
            return self.link.write_all(INVALID_ID);
        }

        let packet = match Packet::parse(frame) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("malformed frame: {:?}", e);
                return self.nack();
            }
        };

        if verify_packet(&mut self.crc, &packet) == Integrity::Invalid {
            warn!("crc mismatch for {:?}", packet.command());
            return self.nack();
        }

        let request = match Request::decode(&packet) {
            Ok(request) => request,
            Err(e) => {
                warn!("bad {:?} payload: {:?}", packet.command(), e);
                return self.nack();
            }
        };

        debug!("request {:?}", request.command());

        match request {
            Request::GetVersion => self.reply(&[BOOTLOADER_VERSION]),
            Request::GetHelp => self.reply(&Command::supported_codes()),
            Request::GetChipId => {
                let id = self.device.chip_id() & DEV_ID_MASK;
                self.reply(&id.to_le_bytes())
            }
            Request::GoToAddress { address } => self.go_to_address(address),
            Request::FlashErase { page, count } => self.flash_erase(page, count),
            Request::MemoryWrite { address, data } => self.memory_write(address, data),
            Request::Reserved(command) => {
                debug!("{:?} accepted, nothing to do", command);
                self.reply(&[])
            }
        }
    }

    fn nack(&mut self) -> Result<(), L::Error> {
        self.link.write_all(&[NACK])
    }

    fn reply(&mut self, payload: &[u8]) -> Result<(), L::Error> {
        self.link.write_all(&ack_header(payload.len() as u8))?;
        self.link.write_all(payload)
    }

    fn go_to_address(&mut self, address: u32) -> Result<(), L::Error> {
        self.link.write_all(&ack_header(1))?;

        let status = classify(address);
        self.link.write_all(&[status as u8])?;

        if status == AddressStatus::Invalid {
            warn!("refusing jump to {:#x}", address);
            return Ok(());
        }

        self.link.flush()?;
        let target = JumpTarget::thumb(address);
        info!("jumping to {:#x}", target.address());
        // SAFETY: the target sits inside flash or the SRAM window, and the
        // host asked for this transfer explicitly
        unsafe { self.device.jump(target) }
    }

    fn flash_erase(&mut self, page: u8, count: u8) -> Result<(), L::Error> {
        self.link.write_all(&ack_header(1))?;
        let result = flash::erase(&mut self.flash, &mut self.strobe, page, count);
        self.link.write_all(&[flash_status(result)])
    }

    fn memory_write(&mut self, address: u32, data: &[u8]) -> Result<(), L::Error> {
        self.link.write_all(&ack_header(1))?;
        let result = flash::program(&mut self.flash, data, address);
        self.link.write_all(&[flash_status(result)])
    }

    /// Hand over to the image whose vector table is at `image_base`
    ///
    /// # Safety
    ///
    /// See [`Device::boot_image`].
    pub unsafe fn boot_image(&mut self, image_base: u32) -> ! {
        let _ = self.link.flush();
        info!("booting image at {:#x}", image_base);
        self.device.boot_image(image_base)
    }
}
