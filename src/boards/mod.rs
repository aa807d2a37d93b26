/*
 * SPDX-FileCopyrightText: © 2023 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

use embassy_stm32::crc::Crc;
use embassy_stm32::gpio::{AnyPin, Input, Output};
use embassy_stm32::peripherals;
use embassy_stm32::usart::{BufferedUartRx, BufferedUartTx};
use serial_boots::types::response::FlashError;
use serial_boots::types::{PAGE_SIZE, USER_APP_ADDRESS};
use serial_boots::{CrcUnit, Device, EraseRequest, FlashController, JumpTarget, VectorTable};

use crate::pac;

#[cfg(feature = "hw_bluepill")]
use self::bluepill::*;

#[cfg(feature = "hw_bluepill")]
mod bluepill;

pub type HostRx = BufferedUartRx<'static, peripherals::USART1>;
pub type HostTx = BufferedUartTx<'static, peripherals::USART1>;

pub struct Hardware {
    pub crc: HwCrc,
    pub flash: Stm32f1Flash,
    pub tx: HostTx,
    pub rx: HostRx,
    /// High while a flash erase is in progress
    pub strobe: Output<'static, AnyPin>,
    /// Pulled up, held low to stay in the bootloader
    pub force_bootloader: Input<'static, AnyPin>,
    pub device: Stm32Device,
}

impl Hardware {
    /// Initialize MCU PLL and CPU on init hardware
    pub fn mcu_pre_init() -> embassy_stm32::Peripherals {
        embassy_stm32::init(Default::default())
    }

    /// Initialize MCU peripherals and nearby components
    #[inline]
    pub fn init() -> Self {
        hardware_specific_init(Self::mcu_pre_init())
    }

    pub fn force_bootloader(&self) -> bool {
        self.force_bootloader.is_low()
    }

    /// Vector table of the resident application
    pub fn user_vector_table(&self) -> VectorTable {
        // SAFETY: USER_APP_ADDRESS is word aligned and inside flash, always readable
        let words = unsafe {
            let base = USER_APP_ADDRESS as *const u32;
            [base.read_volatile(), base.add(1).read_volatile()]
        };
        VectorTable::from_words(words)
    }
}

/// The CRC unit fed through its 32-bit data register, one byte per word
pub struct HwCrc(pub Crc<'static>);

impl CrcUnit for HwCrc {
    fn accumulate(&mut self, byte: u8) -> u32 {
        self.0.feed_word(byte as u32)
    }

    fn reset(&mut self) {
        self.0.reset();
    }
}

/// Spins on BSY before giving up with [`FlashError::Timeout`]
const BUSY_SPIN_LIMIT: u32 = 0x000F_FFFF;

const FLASH_KEY1: u32 = 0x4567_0123;
const FLASH_KEY2: u32 = 0xCDEF_89AB;

/// Flash program/erase controller, driven through its registers
pub struct Stm32f1Flash {
    _peri: peripherals::FLASH,
}

impl Stm32f1Flash {
    pub fn new(peri: peripherals::FLASH) -> Self {
        Self { _peri: peri }
    }

    fn wait_ready() -> Result<(), FlashError> {
        let regs = pac::FLASH;
        for _ in 0..BUSY_SPIN_LIMIT {
            let sr = regs.sr().read();
            if sr.bsy() {
                continue;
            }
            // error flags are write-one-to-clear
            regs.sr().write(|w| {
                w.set_eop(true);
                w.set_pgerr(true);
                w.set_wrprterr(true);
            });
            return match sr.pgerr() || sr.wrprterr() {
                true => Err(FlashError::Error),
                false => Ok(()),
            };
        }
        Err(FlashError::Timeout)
    }

    fn start_erase(&mut self, request: EraseRequest) -> Result<(), FlashError> {
        let regs = pac::FLASH;
        match request {
            EraseRequest::Mass => {
                regs.cr().modify(|w| w.set_mer(true));
                regs.cr().modify(|w| w.set_strt(true));
                let ret = Self::wait_ready();
                regs.cr().modify(|w| w.set_mer(false));
                ret
            }
            EraseRequest::Pages { address, count } => {
                regs.cr().modify(|w| w.set_per(true));
                let mut ret = Ok(());
                for page in 0..count as u32 {
                    regs.ar().write(|w| w.set_far(address + page * PAGE_SIZE));
                    regs.cr().modify(|w| w.set_strt(true));
                    ret = Self::wait_ready();
                    if ret.is_err() {
                        break;
                    }
                }
                regs.cr().modify(|w| w.set_per(false));
                ret
            }
        }
    }
}

impl FlashController for Stm32f1Flash {
    fn unlock(&mut self) {
        let regs = pac::FLASH;
        if regs.cr().read().lock() {
            regs.keyr().write_value(FLASH_KEY1);
            regs.keyr().write_value(FLASH_KEY2);
        }
    }

    fn lock(&mut self) {
        pac::FLASH.cr().modify(|w| w.set_lock(true));
    }

    fn erase(&mut self, request: EraseRequest) -> Result<(), FlashError> {
        Self::wait_ready()?;
        let started = embassy_time::Instant::now();
        let ret = self.start_erase(request);
        debug!("erase took {} ms", started.elapsed().as_millis());
        ret
    }

    fn program_halfword(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        let regs = pac::FLASH;
        Self::wait_ready()?;

        regs.cr().modify(|w| w.set_pg(true));
        // SAFETY: the address was range checked into flash or SRAM and is half-word aligned
        unsafe { core::ptr::write_volatile(address as *mut u16, value) };
        core::sync::atomic::fence(core::sync::atomic::Ordering::SeqCst);
        let ret = Self::wait_ready();
        regs.cr().modify(|w| w.set_pg(false));
        ret
    }
}

pub struct Stm32Device;

impl Device for Stm32Device {
    fn chip_id(&self) -> u16 {
        pac::DBGMCU.idcode().read().dev_id()
    }

    unsafe fn boot_image(&mut self, image_base: u32) -> ! {
        quiesce();
        let scb = &*cortex_m::peripheral::SCB::PTR;
        scb.vtor.write(image_base);
        cortex_m::asm::bootload(image_base as *const u32)
    }

    unsafe fn jump(&mut self, target: JumpTarget) -> ! {
        quiesce();
        let entry: extern "C" fn() -> ! = core::mem::transmute(target.address() as usize);
        entry()
    }
}

/// Silence every interrupt source the bootloader may have armed
unsafe fn quiesce() {
    cortex_m::interrupt::disable();

    let nvic = &*cortex_m::peripheral::NVIC::PTR;
    for i in 0..nvic.icer.len() {
        nvic.icer[i].write(0xFFFF_FFFF);
        nvic.icpr[i].write(0xFFFF_FFFF);
    }

    let syst = &*cortex_m::peripheral::SYST::PTR;
    syst.csr.write(0);

    cortex_m::asm::dsb();
    cortex_m::asm::isb();
    cortex_m::interrupt::enable();
}
