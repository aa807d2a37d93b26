/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Software model of the STM32F1 CRC unit.
//!
//! The peripheral only takes 32-bit words. The bootloader feeds it one word per
//! packet byte (the byte zero-extended), so the host has to do the same.

use crc::{Algorithm, Crc, Digest};

use crate::integrity::CrcUnit;

const STM32_CRC: Algorithm<u32> = Algorithm {
    width: 32,
    poly: 0x04C1_1DB7,
    init: 0xFFFF_FFFF,
    refin: false,
    refout: false,
    xorout: 0x0000_0000,
    check: 0x0376_E6E7,
    residue: 0x0000_0000,
};

static CRC: Crc<u32> = Crc::<u32>::new(&STM32_CRC);

#[inline]
fn feed(digest: &mut Digest<'static, u32>, byte: u8) {
    // the peripheral shifts the data register MSB first
    digest.update(&(byte as u32).to_be_bytes());
}

/// Checksum a frame the way the bootloader does
pub fn std_crc(bytes: &[u8]) -> u32 {
    let mut digest = CRC.digest();
    for &b in bytes {
        feed(&mut digest, b);
    }
    digest.finalize()
}

/// [`CrcUnit`] backed by the `crc` crate, for hosts and chips without the peripheral
#[derive(Clone)]
pub struct SoftCrc {
    digest: Digest<'static, u32>,
}

impl SoftCrc {
    pub fn new() -> Self {
        Self {
            digest: CRC.digest(),
        }
    }
}

impl Default for SoftCrc {
    fn default() -> Self {
        Self::new()
    }
}

impl CrcUnit for SoftCrc {
    fn accumulate(&mut self, byte: u8) -> u32 {
        feed(&mut self.digest, byte);
        self.digest.clone().finalize()
    }

    fn reset(&mut self) {
        self.digest = CRC.digest();
    }
}
