/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

use embedded_io::{ErrorType, Read, Write};

/// Rejoins the split halves of a UART into one blocking link
pub struct SerialLink<Rx, Tx> {
    rx: Rx,
    tx: Tx,
}

impl<Rx, Tx> SerialLink<Rx, Tx> {
    pub fn new(rx: Rx, tx: Tx) -> Self {
        Self { rx, tx }
    }

    pub fn split(self) -> (Rx, Tx) {
        (self.rx, self.tx)
    }

    pub fn rx(&self) -> &Rx {
        &self.rx
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }
}

impl<Rx, Tx> ErrorType for SerialLink<Rx, Tx>
where
    Rx: ErrorType,
    Tx: ErrorType<Error = Rx::Error>,
{
    type Error = Rx::Error;
}

impl<Rx, Tx> Read for SerialLink<Rx, Tx>
where
    Rx: Read,
    Tx: ErrorType<Error = Rx::Error>,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.rx.read(buf)
    }
}

impl<Rx, Tx> Write for SerialLink<Rx, Tx>
where
    Rx: ErrorType,
    Tx: Write<Error = Rx::Error>,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.tx.flush()
    }
}
