/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

use crate::types::response::AddressStatus;
use crate::types::{FLASH_BANK1_END, FLASH_BASE, SRAM_BASE, SRAM_WINDOW};

/// Memory the host may write to or jump into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    Flash,
    Sram,
}

impl Region {
    pub fn of(address: u32) -> Option<Self> {
        if (FLASH_BASE..=FLASH_BANK1_END).contains(&address) {
            Some(Self::Flash)
        } else if (SRAM_BASE..SRAM_BASE + SRAM_WINDOW).contains(&address) {
            Some(Self::Sram)
        } else {
            None
        }
    }
}

pub fn classify(address: u32) -> AddressStatus {
    match Region::of(address) {
        Some(_) => AddressStatus::Valid,
        None => AddressStatus::Invalid,
    }
}

/// Valid when `[address, address + len)` sits inside a single region.
/// An empty range only needs a valid start.
pub fn classify_range(address: u32, len: usize) -> AddressStatus {
    let Some(region) = Region::of(address) else {
        return AddressStatus::Invalid;
    };
    if len == 0 {
        return AddressStatus::Valid;
    }

    let last = u32::try_from(len - 1)
        .ok()
        .and_then(|span| address.checked_add(span));
    match last.and_then(Region::of) {
        Some(r) if r == region => AddressStatus::Valid,
        _ => AddressStatus::Invalid,
    }
}
