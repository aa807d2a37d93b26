/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Packet integrity check over a stateful CRC unit.

use crate::types::frame::Packet;

/// Accumulating CRC engine, usually the CRC peripheral.
///
/// The accumulator is shared state. Go through [`compute`] so it is always
/// left reset for the next caller.
pub trait CrcUnit {
    /// Feed one byte, returns the running value
    fn accumulate(&mut self, byte: u8) -> u32;
    fn reset(&mut self);
}

/// CRC of `bytes`, leaving `unit` reset
pub fn compute<C: CrcUnit>(unit: &mut C, bytes: &[u8]) -> u32 {
    let mut value = 0;
    for &b in bytes {
        value = unit.accumulate(b);
    }
    unit.reset();
    value
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Integrity {
    Valid,
    Invalid,
}

pub fn verify<C: CrcUnit>(unit: &mut C, payload: &[u8], host_value: u32) -> Integrity {
    match compute(unit, payload) == host_value {
        true => Integrity::Valid,
        false => Integrity::Invalid,
    }
}

/// Check a frame against its own trailer
pub fn verify_packet<C: CrcUnit>(unit: &mut C, packet: &Packet<'_>) -> Integrity {
    verify(unit, packet.covered(), packet.trailer())
}
