/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Packet receiver and the bootloader's main loop.
//!
//! Reads block without a timeout: with no host attached the bootloader just
//! parks on the length byte.

use embedded_hal::digital::OutputPin;
use embedded_io::{Read, ReadExactError, Write};

use crate::dispatch::Bootloader;
use crate::flash::FlashController;
use crate::integrity::CrcUnit;
use crate::launch::Device;
use crate::types::frame::FRAME_BUFFER_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportError<E> {
    /// Link closed in the middle of a frame
    Eof,
    Link(E),
}

impl<E> From<ReadExactError<E>> for TransportError<E> {
    fn from(e: ReadExactError<E>) -> Self {
        match e {
            ReadExactError::UnexpectedEof => Self::Eof,
            ReadExactError::Other(e) => Self::Link(e),
        }
    }
}

/// Read one length-prefixed frame into `buf`, length byte included
pub fn receive_frame<'b, R: Read>(
    rx: &mut R,
    buf: &'b mut [u8; FRAME_BUFFER_SIZE],
) -> Result<&'b [u8], TransportError<R::Error>> {
    rx.read_exact(&mut buf[..1])?;
    let len = buf[0] as usize;
    rx.read_exact(&mut buf[1..=len])?;
    trace!("received frame of {} bytes", len + 1);
    Ok(&buf[..=len])
}

impl<L, C, F, P, D> Bootloader<L, C, F, P, D>
where
    L: Read + Write,
    C: CrcUnit,
    F: FlashController,
    P: OutputPin,
    D: Device,
{
    /// Receive and handle exactly one frame
    pub fn poll(&mut self) -> Result<(), TransportError<L::Error>> {
        let mut buf = [0u8; FRAME_BUFFER_SIZE];
        let frame = receive_frame(&mut self.link, &mut buf)?;
        self.handle(frame).map_err(TransportError::Link)
    }

    /// Serve the host forever. Leaves only through GO_TO_ADDR.
    pub fn run(mut self) -> ! {
        info!("bootloader ready");
        loop {
            match self.poll() {
                Ok(()) => {}
                Err(TransportError::Eof) => warn!("link closed mid frame"),
                Err(TransportError::Link(_)) => warn!("serial link error, frame dropped"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{bootloader, frame, MockRx};
    use crate::types::command::Command;
    use crate::types::frame::Request;
    use crate::types::response::{ACK, NACK};
    use embedded_io::ErrorKind;

    #[test]
    fn reads_exactly_one_frame() {
        let mut input = frame(Request::GetVersion);
        let first = input.len();
        input.extend_from_slice(&frame(Request::GetHelp));

        let mut rx = MockRx::new(&input);
        let mut buf = [0u8; FRAME_BUFFER_SIZE];
        let got = receive_frame(&mut rx, &mut buf).unwrap();
        assert_eq!(got, &input[..first]);

        let got = receive_frame(&mut rx, &mut buf).unwrap();
        assert_eq!(got, &input[first..]);
        assert!(rx.is_empty());
    }

    #[test]
    fn largest_length_byte_fits_the_buffer() {
        let mut input = vec![255u8];
        input.extend(core::iter::repeat(0x11).take(255));
        let mut rx = MockRx::new(&input);
        let mut buf = [0u8; FRAME_BUFFER_SIZE];
        assert_eq!(receive_frame(&mut rx, &mut buf).unwrap().len(), 256);
    }

    #[test]
    fn short_input_is_eof() {
        let mut rx = MockRx::new(&[8, Command::GET_VER, 0]);
        let mut buf = [0u8; FRAME_BUFFER_SIZE];
        assert_eq!(
            receive_frame(&mut rx, &mut buf),
            Err(TransportError::Eof)
        );
    }

    #[test]
    fn link_errors_are_surfaced() {
        let mut rx = MockRx::new(&[]);
        rx.fail_when_empty = true;
        let mut buf = [0u8; FRAME_BUFFER_SIZE];
        assert_eq!(
            receive_frame(&mut rx, &mut buf),
            Err(TransportError::Link(ErrorKind::Other))
        );
    }

    #[test]
    fn poll_serves_frames_back_to_back() {
        let mut input = frame(Request::GetVersion);
        input.extend_from_slice(&[2, Command::GET_HELP, 0]);
        input.extend_from_slice(&frame(Request::Reserved(Command::MemoryRead)));

        let mut boot = bootloader(&input);
        boot.poll().unwrap();
        boot.poll().unwrap();
        boot.poll().unwrap();
        assert_eq!(boot.poll(), Err(TransportError::Eof));

        assert_eq!(boot.link_output(), [ACK, 1, 0x02, NACK, ACK, 0]);
    }

    #[test]
    fn oversized_frame_is_drained_and_nacked() {
        let mut input = vec![255u8, Command::GET_VER];
        input.extend(core::iter::repeat(0).take(254));
        input.extend_from_slice(&frame(Request::GetVersion));

        let mut boot = bootloader(&input);
        boot.poll().unwrap();
        boot.poll().unwrap();
        assert_eq!(boot.link_output(), [NACK, ACK, 1, 0x02]);
    }
}
