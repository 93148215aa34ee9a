// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{actuation::DutyCommand, clock::Duration, pid::PidParams, temp::SensorCurve};

/// Compile time controller configuration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Coolant temperature setpoint in degree Celsius.
    pub setpoint: f32,
    pub pid: PidParams,
    /// Lowest duty cycle the fans are ever driven with.
    pub min_duty: DutyCommand,
    /// Rate of the base timer interrupt.
    pub timer_irq_hz: u32,
    pub temp_sample_hz: u32,
    pub rpm_window_ms: u32,
    pub pid_period_ms: u32,
    pub report_period_ms: u32,
    pub debounce_us: u32,
    pub pulses_per_rev: u32,
    pub sensor: SensorCurve,
    /// Raw reading the temperature buffer starts out with.
    pub temp_prefill: u16,
}

impl Config {
    pub const DEFAULT: Self = Self {
        setpoint: 35.0,
        pid: PidParams {
            kp: 2.0,
            ki: 0.02,
            kd: 0.0,
        },
        min_duty: DutyCommand::from_percent(20),
        timer_irq_hz: 1000,
        temp_sample_hz: 10,
        rpm_window_ms: 3750,
        pid_period_ms: 30_000,
        report_period_ms: 2000,
        debounce_us: 1000,
        pulses_per_rev: 2,
        sensor: SensorCurve::WATER_12BIT,
        temp_prefill: 725,
    };

    /// Check the configuration. Panics (at compile time, if const evaluated) on error.
    pub const fn validate(&self) {
        assert!(self.pid.ki != 0.0);
        assert!(self.pulses_per_rev > 0);
        assert!(self.rpm_window_ms > 0);
        assert!(60_000 % (self.rpm_window_ms * self.pulses_per_rev) == 0);

        assert!(self.temp_sample_hz > 0);
        assert!(self.timer_irq_hz % self.temp_sample_hz == 0);
        Self::validate_period(self.timer_irq_hz, self.rpm_window_ms);
        Self::validate_period(self.timer_irq_hz, self.pid_period_ms);

        assert!(self.report_period_ms > 0);
        assert!((self.report_period_ms * self.temp_sample_hz) % 1000 == 0);
        assert!(self.temp_samples() > 0 && self.temp_samples() <= u8::MAX as usize);

        assert!(self.temp_prefill > 0);
        assert!((self.temp_prefill as f32) < self.sensor.adc_max);
    }

    const fn validate_period(irq_hz: u32, ms: u32) {
        assert!((ms * irq_hz) % 1000 == 0);
        assert!(ms * irq_hz / 1000 > 0);
    }

    /// RPM per pulse counted in one window.
    pub const fn rpm_scale(&self) -> u32 {
        60_000 / (self.rpm_window_ms * self.pulses_per_rev)
    }

    /// Number of base timer interrupts in `ms` milliseconds.
    pub const fn irq_ticks(&self, ms: u32) -> u32 {
        ms * self.timer_irq_hz / 1000
    }

    /// Base timer interrupts per temperature sample.
    pub const fn temp_divider(&self) -> u32 {
        self.timer_irq_hz / self.temp_sample_hz
    }

    /// Temperature samples per report period.
    pub const fn temp_samples(&self) -> usize {
        (self.report_period_ms * self.temp_sample_hz / 1000) as usize
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_micros(self.debounce_us)
    }

    pub const fn report_period(&self) -> Duration {
        Duration::from_millis(self.report_period_ms)
    }
}


// vim: ts=4 sw=4 expandtab
