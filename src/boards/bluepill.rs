/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Hardware initialization code for the STM32F103C8 "Blue Pill" board.
//! Host link on USART1 (PA9 TX, PA10 RX), erase strobe on PC14 and the
//! force-bootloader jumper on PB12.

use embassy_stm32::crc::Crc;
use embassy_stm32::gpio::{Input, Level, Output, Pin, Pull, Speed};
use embassy_stm32::usart::BufferedUart;
use embassy_stm32::{bind_interrupts, peripherals};
use static_cell::StaticCell;

use super::{Hardware, HwCrc, Stm32Device, Stm32f1Flash};

bind_interrupts!(struct Irqs {
    USART1 => embassy_stm32::usart::BufferedInterruptHandler<peripherals::USART1>;
});

// one full frame fits in the RX ring
static UART_RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static UART_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

pub fn hardware_specific_init(p: embassy_stm32::Peripherals) -> Hardware {
    let usart_rx_buf = UART_RX_BUF.init([0u8; 512]);
    let usart_tx_buf = UART_TX_BUF.init([0u8; 64]);

    let usart1_config = {
        let mut ret = embassy_stm32::usart::Config::default();
        ret.baudrate = 115200;
        ret.detect_previous_overrun = true;
        ret
    };

    let (tx, rx) = BufferedUart::new(
        p.USART1,
        Irqs,
        p.PA10,
        p.PA9,
        usart_tx_buf,
        usart_rx_buf,
        usart1_config,
    )
    .unwrap_or_else(|_| panic!())
    .split();

    Hardware {
        crc: HwCrc(Crc::new(p.CRC)),
        flash: Stm32f1Flash::new(p.FLASH),
        tx,
        rx,
        strobe: Output::new(p.PC14.degrade(), Level::Low, Speed::Low),
        force_bootloader: Input::new(p.PB12.degrade(), Pull::Up),
        device: Stm32Device,
    }
}
