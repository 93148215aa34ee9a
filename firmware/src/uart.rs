// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hw::mcu;
use core::fmt;
use fanctl::{
    fifo::{Fifo, LineBuf},
    mutex::{IrqCtx, LazyInit, MainCtx},
    report::{FmtSink, StatusReport, StatusSink},
};

const FCPU: u32 = 16_000_000;
const BAUD: u32 = 38_400;
const UBRR: u16 = (FCPU / (16 * BAUD) - 1) as u16;

/// Holds the longest burst of one main loop iteration:
/// PID and duty log lines, the status report and the stack line.
static TX: Fifo<256> = Fifo::new();

/// Status UART. Transmit only.
pub struct Uart {
    usart: mcu::USART0,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static UART: LazyInit<Uart> = unsafe { LazyInit::uninit() };

impl Uart {
    #[rustfmt::skip]
    pub fn new(usart: mcu::USART0) -> Self {
        usart.ubrr0().write(|w| w.set(UBRR));
        usart.ucsr0a().write(|w| w.set(0));
        // 8N1
        usart.ucsr0c().write(|w| w.set(0x06));
        usart.ucsr0b().write(|w| w.txen0().set_bit());
        Self { usart }
    }

    /// Start the transmission of pending data.
    pub fn kick(&self, _m: &MainCtx<'_>) {
        critical_section::with(|cs| {
            if !TX.is_empty(cs) {
                self.usart.ucsr0b().modify(|_, w| w.udrie0().set_bit());
            }
        });
    }
}

/// Data register empty interrupt.
pub fn irq_handler_usart0_udre(c: &IrqCtx) {
    let usart = &UART.irq(c).usart;
    match TX.get(c.cs()) {
        Some(data) => usart.udr0().write(|w| w.set(data)),
        None => usart.ucsr0b().modify(|_, w| w.udrie0().clear_bit()),
    }
}

/// Queue text for transmission.
///
/// Never blocks. A line that doesn't fit into the FIFO is dropped as a whole.
pub struct UartWriter;

impl fmt::Write for UartWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        critical_section::with(|cs| TX.insert_all(cs, s.as_bytes()));
        Ok(())
    }

    /// Format the complete line first, so that it is queued in one piece.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        let mut line = LineBuf::<128>::new();
        if fmt::write(&mut line, args).is_ok() {
            critical_section::with(|cs| TX.insert_all(cs, line.as_bytes()));
        }
        Ok(())
    }
}

pub struct UartStatus {
    sink: FmtSink<UartWriter>,
}

impl UartStatus {
    pub fn new() -> Self {
        Self {
            sink: FmtSink::new(UartWriter),
        }
    }
}

impl StatusSink for UartStatus {
    fn report<const N: usize>(&mut self, report: &StatusReport<N>) {
        self.sink.report(report);
        #[cfg(feature = "debug")]
        log::debug!("stack {}", avr_stack::estimate_unused_stack_space());
    }
}

#[cfg(feature = "debug")]
struct UartLogger;

#[cfg(feature = "debug")]
impl log::Log for UartLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        use fmt::Write as _;

        if self.enabled(record.metadata()) {
            let _ = write!(UartWriter, "{} {}\r\n", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

#[cfg(feature = "debug")]
static LOGGER: UartLogger = UartLogger;

#[cfg(feature = "debug")]
pub fn logger_init() {
    // SAFETY: Called once from main() before interrupts are enabled.
    //         Nothing else touches the logger state concurrently.
    unsafe {
        let _ = log::set_logger_racy(&LOGGER);
        log::set_max_level_racy(log::LevelFilter::Debug);
    }
}

// vim: ts=4 sw=4 expandtab
