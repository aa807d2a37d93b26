/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Flash erase and program engines.
//!
//! The controller is only reachable through a [`FlashSession`], which unlocks
//! it on open and locks it again when dropped, early returns included.

use embedded_hal::digital::OutputPin;

use crate::address::classify_range;
use crate::types::response::{AddressStatus, FlashError};
use crate::types::{FLASH_BASE, MASS_ERASE_PAGE, MAX_PAGES, PAGE_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EraseRequest {
    /// Whole bank
    Mass,
    /// `count` pages starting at the page holding `address`
    Pages { address: u32, count: u8 },
}

/// Raw flash controller primitives
pub trait FlashController {
    fn unlock(&mut self);
    fn lock(&mut self);
    fn erase(&mut self, request: EraseRequest) -> Result<(), FlashError>;
    fn program_halfword(&mut self, address: u32, value: u16) -> Result<(), FlashError>;
}

/// Exclusive unlocked access to the controller
pub struct FlashSession<'a, F: FlashController> {
    flash: &'a mut F,
}

impl<'a, F: FlashController> FlashSession<'a, F> {
    pub fn open(flash: &'a mut F) -> Self {
        flash.unlock();
        Self { flash }
    }

    pub fn erase(&mut self, request: EraseRequest) -> Result<(), FlashError> {
        self.flash.erase(request)
    }

    pub fn program_halfword(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        self.flash.program_halfword(address, value)
    }
}

impl<F: FlashController> Drop for FlashSession<'_, F> {
    fn drop(&mut self) {
        self.flash.lock();
    }
}

/// Holds the diagnostic pin high for its lifetime
struct Strobe<'a, P: OutputPin> {
    pin: &'a mut P,
}

impl<'a, P: OutputPin> Strobe<'a, P> {
    fn on(pin: &'a mut P) -> Self {
        let _ = pin.set_high();
        Self { pin }
    }
}

impl<P: OutputPin> Drop for Strobe<'_, P> {
    fn drop(&mut self) {
        let _ = self.pin.set_low();
    }
}

/// Work out what an erase command asks for.
///
/// Oversized counts are clamped at the last page. `Ok(None)` means nothing is
/// left to erase.
pub fn plan_erase(start_page: u8, page_count: u8) -> Result<Option<EraseRequest>, FlashError> {
    if start_page == MASS_ERASE_PAGE {
        return Ok(Some(EraseRequest::Mass));
    }
    if start_page >= MAX_PAGES {
        return Err(FlashError::Error);
    }

    let count = page_count.min(MAX_PAGES - start_page);
    if count == 0 {
        return Ok(None);
    }

    Ok(Some(EraseRequest::Pages {
        address: FLASH_BASE + start_page as u32 * PAGE_SIZE,
        count,
    }))
}

pub fn erase<F, P>(
    flash: &mut F,
    strobe: &mut P,
    start_page: u8,
    page_count: u8,
) -> Result<(), FlashError>
where
    F: FlashController,
    P: OutputPin,
{
    let request = match plan_erase(start_page, page_count) {
        Ok(Some(request)) => request,
        Ok(None) => {
            debug!("erase of zero pages at page {}", start_page);
            return Ok(());
        }
        Err(e) => {
            warn!("erase rejected, start page {}", start_page);
            return Err(e);
        }
    };

    info!("erase {:?}", request);

    let mut session = FlashSession::open(flash);
    let _strobe = Strobe::on(strobe);
    session.erase(request)
}

/// Program `data` at `address` one half-word at a time.
///
/// Every half-word gets its own unlock/program/lock. The first failure stops
/// the write and leaves whatever was already programmed in place.
pub fn program<F: FlashController>(flash: &mut F, data: &[u8], address: u32) -> Result<(), FlashError> {
    if classify_range(address, data.len()) == AddressStatus::Invalid {
        warn!("write of {} bytes at {:#x} out of range", data.len(), address);
        return Err(FlashError::Error);
    }
    if data.len() % 2 != 0 || address % 2 != 0 {
        warn!("unaligned write of {} bytes at {:#x}", data.len(), address);
        return Err(FlashError::Error);
    }

    for (offset, word) in (0u32..).step_by(2).zip(data.chunks_exact(2)) {
        let value = u16::from_le_bytes([word[0], word[1]]);
        let mut session = FlashSession::open(flash);
        if let Err(e) = session.program_halfword(address + offset, value) {
            error!("program failed at {:#x}", address + offset);
            return Err(e);
        }
    }

    debug!("wrote {} bytes at {:#x}", data.len(), address);
    Ok(())
}
