/*
 * SPDX-FileCopyrightText: © 2023 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

#![no_main]
#![no_std]

// must come first, boards use its macros
mod fmt;

pub mod pac {
    pub use embassy_stm32::pac::Interrupt as interrupt;
    pub use embassy_stm32::pac::*;
}

mod boards;

use cortex_m_rt::entry;
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_abort as _;
use serial_boots::types::USER_APP_ADDRESS;
use serial_boots::{Bootloader, SerialLink};

use crate::boards::Hardware;

#[entry]
fn main() -> ! {
    let hardware = Hardware::init();

    let forced = hardware.force_bootloader();
    let table = hardware.user_vector_table();
    let present = table.image_present();
    info!(
        "boot decision: forced {}, image present {} ({:?})",
        forced, present, table
    );

    let Hardware {
        crc,
        flash,
        tx,
        rx,
        strobe,
        force_bootloader: _,
        device,
    } = hardware;

    let mut bootloader = Bootloader::new(SerialLink::new(rx, tx), crc, flash, strobe, device);

    if !forced && present {
        // SAFETY: the vector table at USER_APP_ADDRESS passed the image check
        unsafe { bootloader.boot_image(USER_APP_ADDRESS) }
    }

    bootloader.run()
}
