// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hw::mcu;
use fanctl::hal::TachInput;

fn pin_input(_bit: usize) -> u8 {
    0
}
fn pin_output(bit: usize) -> u8 {
    1 << bit
}
fn pin_low(_bit: usize) -> u8 {
    0
}
fn pin_floating(_bit: usize) -> u8 {
    0
}
fn pin_pullup(bit: usize) -> u8 {
    1 << bit
}

/// Release PC2..PC5 (TCK, TMS, TDO, TDI) from the JTAG interface.
///
/// The JTAGEN fuse is programmed from factory.
/// Without this, tachometer inputs of fans 2..5 never see an edge.
fn jtag_disable() {
    // SAFETY: The asm code only accesses MCUCR, which is not accessed
    //         from anywhere else in the program.
    //         Interrupts are still disabled, so the timed sequence is not interrupted.
    unsafe {
        // JTD must be written twice within four cycles.
        core::arch::asm!(
            "lds {tmp}, {MCUCR}",
            "ori {tmp}, 0x80", // JTD=1
            "sts {MCUCR}, {tmp}",
            "sts {MCUCR}, {tmp}",
            tmp = out(reg_upper) _,
            MCUCR = const 0x55,
            options(nostack)
        );
    }
}

#[rustfmt::skip]
pub fn ports_init(
    porta: &mcu::PORTA,
    portb: &mcu::PORTB,
    portc: &mcu::PORTC,
    portd: &mcu::PORTD,
) {
    jtag_disable();

    porta.porta().write(|w| {
        w.set(
            pin_floating(0) | // coolant sensor, single ended ADC
            pin_pullup(1) | // DNC
            pin_pullup(2) | // DNC
            pin_pullup(3) | // DNC
            pin_pullup(4) | // tacho fan 8
            pin_pullup(5) | // tacho fan 9
            pin_pullup(6) | // tacho fan 10
            pin_pullup(7), // tacho fan 11
        )
    });
    porta.ddra().write(|w| w.set(0));

    portb.portb().write(|w| {
        w.set(
            pin_pullup(0) | // DNC
            pin_pullup(1) | // DNC
            pin_pullup(2) | // DNC
            pin_pullup(3) | // DNC
            pin_pullup(4) | // DNC
            pin_pullup(5) | // ISP MOSI
            pin_low(6) | // PWM bottom radiator, bottom row (OC3A)
            pin_pullup(7), // ISP SCK
        )
    });
    portb.ddrb().write(|w| {
        w.set(
            pin_input(0) |
            pin_input(1) |
            pin_input(2) |
            pin_input(3) |
            pin_input(4) |
            pin_input(5) |
            pin_output(6) |
            pin_input(7),
        )
    });

    // Tachometer inputs of fans 0..7.
    // Fans 2..5 share the JTAG pins. See jtag_disable().
    portc.portc().write(|w| w.set(0xFF));
    portc.ddrc().write(|w| w.set(0));

    portd.portd().write(|w| {
        w.set(
            pin_pullup(0) | // RXD0
            pin_low(1) | // TXD0
            pin_pullup(2) | // DNC
            pin_pullup(3) | // DNC
            pin_low(4) | // PWM bottom radiator, top row (OC1B)
            pin_low(5) | // PWM top radiator (OC1A)
            pin_pullup(6) | // DNC
            pin_pullup(7), // DNC
        )
    });
    portd.ddrd().write(|w| {
        w.set(
            pin_input(0) |
            pin_output(1) |
            pin_input(2) |
            pin_input(3) |
            pin_output(4) |
            pin_output(5) |
            pin_input(6) |
            pin_input(7),
        )
    });
}

/// Tachometer levels straight from the port input registers.
pub struct PortTachInput {
    porta: mcu::PORTA,
    portc: mcu::PORTC,
}

impl PortTachInput {
    pub fn new(porta: mcu::PORTA, portc: mcu::PORTC) -> Self {
        Self { porta, portc }
    }
}

impl TachInput for PortTachInput {
    #[inline]
    fn read_levels(&mut self) -> u16 {
        let lo = self.portc.pinc().read().bits();
        let hi = self.porta.pina().read().bits() >> 4;
        u16::from(lo) | (u16::from(hi) << 8)
    }
}

// vim: ts=4 sw=4 expandtab
