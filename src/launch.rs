/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Control transfer out of the bootloader. Nothing here returns once it runs.

use crate::address::Region;
use crate::types::{SRAM_BASE, SRAM_WINDOW};

/// Branch target with the Thumb bit already forced on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JumpTarget(u32);

impl JumpTarget {
    pub const fn thumb(address: u32) -> Self {
        Self(address | 0x01)
    }

    pub const fn address(self) -> u32 {
        self.0
    }
}

/// First two words of a Cortex-M image
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VectorTable {
    pub initial_sp: u32,
    pub reset_vector: u32,
}

impl VectorTable {
    pub const fn from_words(words: [u32; 2]) -> Self {
        Self {
            initial_sp: words[0],
            reset_vector: words[1],
        }
    }

    /// Whether an image looks resident at all: the stack must start inside
    /// SRAM (top of RAM included) and reset must land in flash.
    /// Erased flash reads back `0xFFFF_FFFF` and fails both.
    pub fn image_present(&self) -> bool {
        let sp_ok = self.initial_sp > SRAM_BASE
            && self.initial_sp <= SRAM_BASE + SRAM_WINDOW
            && self.initial_sp % 4 == 0;
        let reset_ok = self.reset_vector & 0x01 == 0x01
            && Region::of(self.reset_vector & !0x01) == Some(Region::Flash);
        sp_ok && reset_ok
    }
}

/// Chip level services the dispatcher needs besides flash and CRC
pub trait Device {
    /// DEV_ID from the debug MCU id register
    fn chip_id(&self) -> u16;

    /// Load MSP from `image_base` and branch to the reset vector at `image_base + 4`.
    ///
    /// # Safety
    ///
    /// `image_base` must hold a vector table. A corrupt image hangs or resets
    /// the device and nothing comes back.
    unsafe fn boot_image(&mut self, image_base: u32) -> !;

    /// Branch to `target` as is, keeping the current stack.
    ///
    /// # Safety
    ///
    /// `target` must be executable code. The caller loses control for good.
    unsafe fn jump(&mut self, target: JumpTarget) -> !;
}
