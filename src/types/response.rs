/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

pub const ACK: u8 = 0xA5;
pub const NACK: u8 = 0x7F;

/// Sent instead of ACK/NACK for an unrecognized command code, NUL included
pub const INVALID_ID: &[u8] = b"Invalid ID\r\n\0";

/// Status byte following ACK(1) for GO_TO_ADDR
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressStatus {
    Valid = 0x00,
    Invalid = 0x01,
}

/// Flash controller failure, sent verbatim after ACK(1) for FLASH_ERASE and MEM_WRITE
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    Error = 0x01,
    Busy = 0x02,
    Timeout = 0x03,
}

pub const FLASH_OK: u8 = 0x00;

/// Status byte for a flash operation outcome
pub fn flash_status(result: Result<(), FlashError>) -> u8 {
    match result {
        Ok(()) => FLASH_OK,
        Err(e) => e as u8,
    }
}

/// Two byte ACK header announcing `reply_len` reply bytes
pub const fn ack_header(reply_len: u8) -> [u8; 2] {
    [ACK, reply_len]
}
