/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Serial command bootloader for STM32F1.
//!
//! The protocol engine is generic over its hardware, see [`Bootloader`]. The
//! firmware binary binds it to the chip.

#![cfg_attr(not(test), no_std)]

// must come first, the other modules use its macros
mod fmt;

pub mod address;
pub mod dispatch;
pub mod flash;
pub mod integrity;
pub mod launch;
pub mod link;
pub mod receiver;
pub mod types;

#[cfg(test)]
mod testing;

pub use dispatch::Bootloader;
pub use flash::{EraseRequest, FlashController};
pub use integrity::CrcUnit;
pub use launch::{Device, JumpTarget, VectorTable};
pub use link::SerialLink;
pub use receiver::TransportError;
