// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART abstraction layer.
//!
//! One serial port carries everything the robot exchanges with a PC: the text console, framed
//! spectra going out and framed sample batches coming in. The port is split so the receive half
//! can be drained from the USART interrupt while the transmit half sits behind the console mutex.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* <baud_rate>
//! ```

use core::fmt;
use nb::block;

use stm32f7xx_hal::{
    prelude::*,
    serial::{Instance, Pins, Rx, Serial, Tx},
};

use crate::protocol::ByteSink;

/// Transmit half.
pub struct Usart<U: Instance> {
    tx: Tx<U>,
}

/// Receive half.
pub struct UsartRx<U: Instance> {
    rx: Rx<U>,
    /// Overrun, framing and noise errors since the last [`UsartRx::take_errors`].
    errors: u32,
}

impl<U: Instance> Usart<U> {
    /// Split `serial` into a blocking writer and a non-blocking reader.
    pub fn new<PINS: Pins<U>>(serial: Serial<U, PINS>) -> (Self, UsartRx<U>) {
        let (tx, rx) = serial.split();
        (Self { tx }, UsartRx { rx, errors: 0 })
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Block until the hardware TX FIFO/drain is flushed.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }
}

impl<U: Instance> UsartRx<U> {
    /// Next received byte, if one is waiting.
    ///
    /// A receive error yields `None` like an empty register, but is counted so the caller can
    /// tell that the byte stream has a gap.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        match self.rx.read() {
            Ok(b) => Some(b),
            Err(nb::Error::WouldBlock) => None,
            Err(nb::Error::Other(_)) => {
                self.errors = self.errors.wrapping_add(1);
                None
            }
        }
    }

    /// Errors seen since the previous call.
    #[inline]
    pub fn take_errors(&mut self) -> u32 {
        core::mem::take(&mut self.errors)
    }
}

impl<U: Instance> ByteSink for Usart<U> {
    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<U: Instance> fmt::Write for Usart<U> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}
