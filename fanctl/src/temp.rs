// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{hal::AnalogInput, mutex::IrqCtx, ring::RollingBuffer};

/// Thermistor in a voltage divider, approximated by a rational function.
///
/// R = (adc_max / raw - 1) * divider_ohms
/// T = offset + (a * R^2 + b * R + c) / (R - d)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SensorCurve {
    pub adc_max: f32,
    pub divider_ohms: f32,
    pub offset: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
}

impl SensorCurve {
    /// Water loop sensor with 2.2 kOhm divider on a 12 bit converter.
    pub const WATER_12BIT: Self = Self {
        adc_max: 4095.0,
        divider_ohms: 2200.0,
        offset: 0.2,
        a: -0.0019,
        b: 38.14,
        c: 43870.0,
        d: 827.0,
    };

    /// Same sensor on a 10 bit converter.
    pub const WATER_10BIT: Self = Self {
        adc_max: 1023.0,
        ..Self::WATER_12BIT
    };

    /// Sensor resistance in Ohms.
    #[inline]
    pub fn resistance(&self, raw: f32) -> f32 {
        (self.adc_max / raw - 1.0) * self.divider_ohms
    }

    /// Temperature in degree Celsius for an averaged raw reading.
    ///
    /// The reading must be in (0, adc_max) and yield R > d.
    /// Outside of that the result is not meaningful (inf or NaN).
    pub fn temperature(&self, raw: f32) -> f32 {
        let r = self.resistance(raw);
        self.offset + (self.a * r * r + self.b * r + self.c) / (r - self.d)
    }
}

pub struct TempSampler<const SIZE: usize> {
    curve: SensorCurve,
    buf: RollingBuffer<SIZE>,
}

impl<const SIZE: usize> TempSampler<SIZE> {
    pub const fn new(curve: SensorCurve, prefill: u16) -> Self {
        Self {
            curve,
            buf: RollingBuffer::new(prefill),
        }
    }

    /// Take one conversion and store it.
    ///
    /// Runs in interrupt context and must not log.
    pub fn sample(&self, c: &IrqCtx<'_>, adc: &mut impl AnalogInput) {
        self.buf.push(c.cs(), adc.read_raw());
    }

    pub fn raw_average(&self) -> f32 {
        critical_section::with(|cs| self.buf.average(cs))
    }

    pub fn temperature(&self) -> f32 {
        self.curve.temperature(self.raw_average())
    }
}


// vim: ts=4 sw=4 expandtab
