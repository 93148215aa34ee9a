// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{SYSTEM, analog::ADC, hw::mcu};
use core::cell::Cell;
use fanctl::{
    Tick,
    hal::TickSource,
    mutex::{IrqCtx, Mutex},
};

/// Timer 0 overflow count. Bits 8..31 of the tick counter.
static TICK_UPPER: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// Timer 2 compare value for the 1 kHz base rate.
/// 16 MHz / 64 / (249 + 1) = 1 kHz
const TC2_OCR: u8 = 249;

/// Free running tick counter on timer 0.
pub struct Clock {
    tc0: mcu::TC0,
}

impl Clock {
    #[rustfmt::skip]
    pub fn new(tc0: mcu::TC0) -> Self {
        // Timer 0 configuration:
        // Normal mode, CS: 64 -> 4 us per timer tick.
        tc0.tccr0a().write(|w| w.set(0));
        tc0.tcnt0().write(|w| w.set(0));
        tc0.tifr0().write(|w| w.tov0().set_bit());
        tc0.timsk0().write(|w| w.toie0().set_bit());
        tc0.tccr0b().write(|w| w.cs0().prescale_64());
        Self { tc0 }
    }
}

impl TickSource for Clock {
    fn now(&self) -> Tick {
        critical_section::with(|cs| {
            let mut upper = TICK_UPPER.borrow(cs).get();
            let mut lower = self.tc0.tcnt0().read().bits();

            // Increment the upper part, if the lower part had an overflow
            // that has not been handled by the interrupt, yet.
            if self.tc0.tifr0().read().tov0().bit_is_set() {
                lower = self.tc0.tcnt0().read().bits();
                upper = upper.wrapping_add(1);
            }

            Tick((upper << 8) | lower as u32)
        })
    }
}

pub fn irq_handler_timer0_ovf(c: &IrqCtx) {
    let upper = TICK_UPPER.borrow(c.cs());
    upper.set(upper.get().wrapping_add(1));
}

#[rustfmt::skip]
pub fn base_rate_init(tc2: &mcu::TC2) {
    // Timer 2 configuration:
    // CTC mode, CS: 64, interrupt on compare match A.
    tc2.tcnt2().write(|w| w.set(0));
    tc2.ocr2a().write(|w| w.set(TC2_OCR));
    tc2.tccr2a().write(|w| w.wgm2().ctc());
    tc2.tifr2().write(|w| w.ocf2a().set_bit());
    tc2.timsk2().write(|w| w.ocie2a().set_bit());
    tc2.tccr2b().write(|w| w.cs2().prescale_64());
}

/// Base rate interrupt.
pub fn irq_handler_timer2_compa(c: &IrqCtx) {
    let mut adc = ADC.irq(c).input();
    SYSTEM.irq_timer(c, &mut adc);
}

// vim: ts=4 sw=4 expandtab
