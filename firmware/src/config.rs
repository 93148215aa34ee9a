// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Board configuration.
//!
//! ATmega1284P at 16 MHz.
//!
//! | Function              | Pin      |
//! |-----------------------|----------|
//! | Coolant sensor        | PA0/ADC0 |
//! | Tacho fans 0..7       | PC0..PC7 |
//! | Tacho fans 8..11      | PA4..PA7 |
//! | PWM top radiator      | PD5/OC1A |
//! | PWM bottom, top row   | PD4/OC1B |
//! | PWM bottom, bottom row| PB6/OC3A |
//! | Status UART TX        | PD1/TXD0 |
//!
//! PC2..PC5 double as the JTAG pins (TCK, TMS, TDO, TDI).
//! The firmware sets `MCUCR.JTD` at startup, so the JTAGEN fuse may stay
//! programmed, but JTAG debugging is not available while it runs.
//!
//! Fans 0..3 are on the top radiator, 4..7 on the top row
//! and 8..11 on the bottom row of the bottom radiator.

use fanctl::{Config, temp::SensorCurve};

/// Number of tachometer inputs.
pub const FANS: usize = 12;

pub const CONFIG: Config = Config {
    sensor: SensorCurve::WATER_10BIT,
    // About 25 degree Celsius.
    temp_prefill: 181,
    ..Config::DEFAULT
};

/// Temperature averaging depth.
pub const SAMPLES: usize = CONFIG.temp_samples();

// vim: ts=4 sw=4 expandtab
