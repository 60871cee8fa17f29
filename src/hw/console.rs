// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! `log` backend printing to the debug USART.
//!
//! The transmit half of USART1 is parked in a global critical-section mutex. Log records and
//! framed debug data both go through [`with_tx`], so a log line can never land inside a frame.
//! Interrupts are only masked while the port is checked out and put back, never while bytes are
//! on the wire, so the receive interrupt keeps draining the host link during a long write.
//!
//! ```ignore
//! let (tx, rx) = Usart::new(serial);
//! console::init(tx, log::LevelFilter::Info);
//! log::info!("ready");
//! ```

use core::cell::RefCell;
use core::fmt::Write;

use cortex_m::interrupt::{self, Mutex};
use log::{LevelFilter, Log, Metadata, Record};
use stm32f7xx_hal::pac::USART1;

use crate::hw::Usart;

static TX: Mutex<RefCell<Option<Usart<USART1>>>> = Mutex::new(RefCell::new(None));
static LOGGER: Console = Console;

struct Console;

impl Log for Console {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        with_tx(|tx| {
            let _ = write!(tx, "[{}] {}\r\n", record.level(), record.args());
        });
    }

    fn flush(&self) {
        with_tx(|tx| tx.flush());
    }
}

/// Install `tx` as the console and register the logger.
///
/// A second call replaces the port but keeps the first logger registration.
pub fn init(tx: Usart<USART1>, level: LevelFilter) {
    interrupt::free(|cs| {
        TX.borrow(cs).replace(Some(tx));
    });
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Run `f` with exclusive access to the console port.
///
/// Does nothing before [`init`] or while another call holds the port, which includes calls made
/// from inside `f` and from interrupts that fire during `f`.
pub fn with_tx<R>(f: impl FnOnce(&mut Usart<USART1>) -> R) -> Option<R> {
    let mut tx = interrupt::free(|cs| TX.borrow(cs).try_borrow_mut().ok()?.take())?;
    let out = f(&mut tx);
    interrupt::free(|cs| {
        TX.borrow(cs).replace(Some(tx));
    });
    Some(out)
}
