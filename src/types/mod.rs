/*
 * SPDX-FileCopyrightText: © 2023 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

use static_assertions::const_assert;

pub mod command;
pub mod frame;
pub mod response;

pub mod std_crc;

/// Bootloader protocol version reported by GET_VER
pub const BOOTLOADER_VERSION: u8 = 0x02;

pub const FLASH_BASE: u32 = 0x0800_0000;
pub const FLASH_BANK1_END: u32 = 0x0801_FFFF;
pub const SRAM_BASE: u32 = 0x2000_0000;
/// Bytes of SRAM reachable by MEM_WRITE and GO_TO_ADDR, starting at [`SRAM_BASE`]
pub const SRAM_WINDOW: u32 = 0x5000;

pub const PAGE_SIZE: u32 = 1024;
pub const MAX_PAGES: u8 = 128;
/// Start page value requesting a whole-bank erase
pub const MASS_ERASE_PAGE: u8 = 0xFF;

/// Vector table of the resident application, right after the bootloader partition
pub const USER_APP_ADDRESS: u32 = 0x0800_8800;

/// DBGMCU_IDCODE, DEV_ID lives in the low 12 bits
pub const DBGMCU_IDCODE: u32 = 0xE004_2000;
pub const DEV_ID_MASK: u16 = 0x0FFF;

const_assert!(FLASH_BASE + MAX_PAGES as u32 * PAGE_SIZE - 1 == FLASH_BANK1_END);
const_assert!(USER_APP_ADDRESS > FLASH_BASE && USER_APP_ADDRESS < FLASH_BANK1_END);
const_assert!((USER_APP_ADDRESS - FLASH_BASE) % PAGE_SIZE == 0);
const_assert!(MASS_ERASE_PAGE >= MAX_PAGES);
