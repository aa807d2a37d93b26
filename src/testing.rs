/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! In-memory stand-ins for the board, shared by the unit tests.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use embedded_io::ErrorKind;

use crate::dispatch::Bootloader;
use crate::flash::{EraseRequest, FlashController};
use crate::launch::{Device, JumpTarget};
use crate::link::SerialLink;
use crate::types::frame::{Request, FRAME_BUFFER_SIZE};
use crate::types::response::FlashError;
use crate::types::std_crc::SoftCrc;
use crate::types::{FLASH_BASE, MAX_PAGES, PAGE_SIZE, SRAM_BASE, SRAM_WINDOW};

pub struct MockRx {
    data: VecDeque<u8>,
    /// Report a link error instead of end of input
    pub fail_when_empty: bool,
}

impl MockRx {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            data: bytes.iter().copied().collect(),
            fail_when_empty: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl embedded_io::ErrorType for MockRx {
    type Error = ErrorKind;
}

impl embedded_io::Read for MockRx {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.data.is_empty() && self.fail_when_empty {
            return Err(ErrorKind::Other);
        }
        let n = buf.len().min(self.data.len());
        for (dst, src) in buf.iter_mut().zip(self.data.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

#[derive(Default)]
pub struct MockTx {
    pub written: Vec<u8>,
    pub flushes: usize,
}

impl embedded_io::ErrorType for MockTx {
    type Error = ErrorKind;
}

impl embedded_io::Write for MockTx {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashOp {
    Unlock,
    Lock,
    Erase(EraseRequest),
    Program(u32, u16),
}

/// Flash bank plus the SRAM window, recording every controller call
pub struct MockFlash {
    pub flash: Vec<u8>,
    pub sram: Vec<u8>,
    pub locked: bool,
    pub ops: Vec<FlashOp>,
    pub erase_result: Result<(), FlashError>,
    /// Index of the program call that fails
    pub fail_program_at: Option<usize>,
    programs: usize,
}

impl MockFlash {
    pub fn new() -> Self {
        Self {
            flash: vec![0xFF; MAX_PAGES as usize * PAGE_SIZE as usize],
            sram: vec![0x00; SRAM_WINDOW as usize],
            locked: true,
            ops: Vec::new(),
            erase_result: Ok(()),
            fail_program_at: None,
            programs: 0,
        }
    }

    fn cell(&mut self, address: u32) -> &mut u8 {
        if address >= SRAM_BASE {
            &mut self.sram[(address - SRAM_BASE) as usize]
        } else {
            &mut self.flash[(address - FLASH_BASE) as usize]
        }
    }

    pub fn read(&mut self, address: u32, len: usize) -> Vec<u8> {
        (address..address + len as u32).map(|a| *self.cell(a)).collect()
    }
}

impl FlashController for MockFlash {
    fn unlock(&mut self) {
        assert!(self.locked, "unlock of an unlocked controller");
        self.locked = false;
        self.ops.push(FlashOp::Unlock);
    }

    fn lock(&mut self) {
        self.locked = true;
        self.ops.push(FlashOp::Lock);
    }

    fn erase(&mut self, request: EraseRequest) -> Result<(), FlashError> {
        assert!(!self.locked, "erase while locked");
        self.ops.push(FlashOp::Erase(request));
        self.erase_result?;

        match request {
            EraseRequest::Mass => self.flash.fill(0xFF),
            EraseRequest::Pages { address, count } => {
                let start = (address - FLASH_BASE) as usize;
                let end = start + count as usize * PAGE_SIZE as usize;
                self.flash[start..end].fill(0xFF);
            }
        }
        Ok(())
    }

    fn program_halfword(&mut self, address: u32, value: u16) -> Result<(), FlashError> {
        assert!(!self.locked, "program while locked");
        self.ops.push(FlashOp::Program(address, value));

        let index = self.programs;
        self.programs += 1;
        if self.fail_program_at == Some(index) {
            return Err(FlashError::Error);
        }

        let [lo, hi] = value.to_le_bytes();
        *self.cell(address) = lo;
        *self.cell(address + 1) = hi;
        Ok(())
    }
}

/// Diagnostic pin that remembers every level it was driven to
#[derive(Default)]
pub struct MockPin {
    pub high: bool,
    pub history: Vec<bool>,
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.history.push(true);
        Ok(())
    }
}

/// Where control went, carried as the panic payload of a mocked transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    Image(u32),
    Jump(u32),
}

pub struct MockDevice {
    pub chip_id: u16,
}

impl Device for MockDevice {
    fn chip_id(&self) -> u16 {
        self.chip_id
    }

    unsafe fn boot_image(&mut self, image_base: u32) -> ! {
        panic::panic_any(Transfer::Image(image_base))
    }

    unsafe fn jump(&mut self, target: JumpTarget) -> ! {
        panic::panic_any(Transfer::Jump(target.address()))
    }
}

/// Run `f`, turning a mocked control transfer into `Err`
pub fn catch_transfer<R>(f: impl FnOnce() -> R) -> Result<R, Transfer> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| match payload.downcast::<Transfer>() {
        Ok(transfer) => *transfer,
        Err(other) => panic::resume_unwind(other),
    })
}

pub type TestLink = SerialLink<MockRx, MockTx>;
pub type TestBootloader = Bootloader<TestLink, SoftCrc, MockFlash, MockPin, MockDevice>;

/// Bootloader over mocks, with `input` queued on the link
pub fn bootloader(input: &[u8]) -> TestBootloader {
    Bootloader::new(
        SerialLink::new(MockRx::new(input), MockTx::default()),
        SoftCrc::new(),
        MockFlash::new(),
        MockPin::default(),
        MockDevice { chip_id: 0x0410 },
    )
}

impl TestBootloader {
    pub fn link_output(&self) -> &[u8] {
        &self.link.tx().written
    }

    pub fn link_flushes(&self) -> usize {
        self.link.tx().flushes
    }
}

/// Encode a request frame, CRC included
pub fn frame(request: Request<'_>) -> Vec<u8> {
    let mut buf = [0u8; FRAME_BUFFER_SIZE];
    let n = request.encode(&mut buf).expect("encodable request");
    buf[..n].to_vec()
}
