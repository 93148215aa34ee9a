// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    actuation::{Actuation, DutyCommand, PWM_CHANNELS, PwmChannel},
    clock::{Duration, Tick, due_time},
    config::Config,
    events::{Event, Events, Periodic},
    hal::{AnalogInput, TachInput, TickSource},
    mutex::{IrqCtx, MainCtx, MainCtxCell},
    pid::{Pid, PidState},
    report::{StatusReport, StatusSink},
    tacho::Tacho,
    temp::TempSampler,
};
use embedded_hal::pwm::SetDutyCycle;

/// Peripherals used by the main loop.
pub struct SysPeriph<C, T, P, S> {
    pub clock: C,
    pub tach: T,
    pub pwm: [P; PWM_CHANNELS],
    pub status: S,
}

/// The complete controller.
///
/// `FANS` is the number of tachometer channels.
/// `SAMPLES` is the temperature averaging depth and must match the configuration.
pub struct System<const FANS: usize, const SAMPLES: usize> {
    report_period: Duration,
    events: Events,
    temp_div: Periodic,
    rpm_div: Periodic,
    pid_div: Periodic,
    temp: TempSampler<SAMPLES>,
    tacho: Tacho<FANS>,
    pid: Pid,
    act: Actuation,
    next_report: MainCtxCell<Tick>,
}

impl<const FANS: usize, const SAMPLES: usize> System<FANS, SAMPLES> {
    pub const fn new(config: Config) -> Self {
        config.validate();
        assert!(SAMPLES == config.temp_samples());

        Self {
            report_period: config.report_period(),
            events: Events::new(),
            temp_div: Periodic::new(config.temp_divider()),
            rpm_div: Periodic::new(config.irq_ticks(config.rpm_window_ms)),
            pid_div: Periodic::new(config.irq_ticks(config.pid_period_ms)),
            temp: TempSampler::new(config.sensor, config.temp_prefill),
            tacho: Tacho::new(config.debounce(), config.rpm_scale()),
            pid: Pid::new(config.setpoint, config.pid),
            act: Actuation::new(config.min_duty),
            next_report: MainCtxCell::new(Tick::new()),
        }
    }

    pub fn init<C, T, P, S>(&self, m: &MainCtx<'_>, p: &mut SysPeriph<C, T, P, S>)
    where
        C: TickSource,
        T: TachInput,
        P: SetDutyCycle,
        S: StatusSink,
    {
        let now = p.clock.now();
        self.next_report.set(m, now + self.report_period);
        self.pid.init(m, now);
        self.tacho.init(m, &mut p.tach, now);
        self.act.apply_duty(m, &mut p.pwm, self.act.min_duty());
    }

    /// Base rate timer interrupt.
    pub fn irq_timer(&self, c: &IrqCtx<'_>, adc: &mut impl AnalogInput) {
        if self.temp_div.tick(c) {
            self.temp.sample(c, adc);
            self.events.raise(c, Event::Temperature);
        }
        if self.rpm_div.tick(c) {
            self.events.raise(c, Event::RpmWindow);
        }
        if self.pid_div.tick(c) {
            self.events.raise(c, Event::PidTick);
        }
    }

    /// One main loop iteration.
    pub fn run<C, T, P, S>(&self, m: &MainCtx<'_>, p: &mut SysPeriph<C, T, P, S>)
    where
        C: TickSource,
        T: TachInput,
        P: SetDutyCycle,
        S: StatusSink,
    {
        let now = p.clock.now();
        let (fired, next) = due_time(self.next_report.get(m), self.report_period, now);
        if fired {
            let report = StatusReport {
                temperature: self.temp.temperature(),
                rpm: self.tacho.rpm_snapshot(),
                duty: self.duty(m),
            };
            p.status.report(&report);
            self.next_report.set(m, next);
        }

        self.tacho.poll(m, &mut p.tach, p.clock.now());

        if self.events.take(m, Event::PidTick) {
            let temperature = self.temp.temperature();
            let y = self.pid.update(m, temperature, p.clock.now());
            let duty = self.act.apply_duty(m, &mut p.pwm, y);
            log::debug!("temp {temperature:.1} duty {duty}");
        }

        // The sample has already been taken in the interrupt.
        if self.events.take(m, Event::Temperature) {
            log::trace!("temp sample {:.0}", self.temp.raw_average());
        }

        if self.events.take(m, Event::RpmWindow) {
            critical_section::with(|cs| self.tacho.compute_rpm_window(cs));
            log::trace!("rpm window");
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temp.temperature()
    }

    pub fn rpm(&self, fan: usize) -> u32 {
        self.tacho.rpm(fan)
    }

    pub fn duty(&self, m: &MainCtx<'_>) -> DutyCommand {
        self.act.applied(m, PwmChannel::TopRadiator)
    }

    pub fn pid_state(&self, m: &MainCtx<'_>) -> PidState {
        self.pid.state(m)
    }
}


// vim: ts=4 sw=4 expandtab
