// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hw::mcu;
use fanctl::{hal::AnalogInput, mutex::LazyInit};

/// Coolant temperature converter.
///
/// Only used from the base rate interrupt after initialization.
pub struct Adc {
    adc: mcu::ADC,
}

// SAFETY: Is initialized when constructing the MainCtx.
pub static ADC: LazyInit<Adc> = unsafe { LazyInit::uninit() };

impl Adc {
    #[rustfmt::skip]
    pub fn new(adc: mcu::ADC) -> Self {
        // AVcc reference, single ended ADC0.
        adc.admux().write(|w| w.refs().avcc().mux().adc0());
        // 16 MHz / 128 = 125 kHz ADC clock.
        adc.adcsra().write(|w| {
            w.adps().prescaler_128()
             .adie().clear_bit()
             .adif().set_bit()
             .adsc().clear_bit()
             .aden().set_bit()
        });

        let this = Self { adc };
        // The first conversion after enabling is slow and inaccurate.
        this.convert();
        this
    }

    fn convert(&self) -> u16 {
        self.adc.adcsra().modify(|_, w| w.adsc().set_bit());
        while self.adc.adcsra().read().adsc().bit_is_set() {}
        self.adc.adc().read().bits()
    }

    pub fn input(&self) -> AdcInput<'_> {
        AdcInput(self)
    }
}

pub struct AdcInput<'a>(&'a Adc);

impl AnalogInput for AdcInput<'_> {
    fn read_raw(&mut self) -> u16 {
        self.0.convert()
    }
}

// vim: ts=4 sw=4 expandtab
