// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    actuation::DutyCommand,
    clock::{Tick, elapsed_since},
    mutex::{MainCtx, MainCtxCell},
};

/// Output with zero deviation and empty integral, in percent.
const OUTPUT_BIAS: f32 = 50.0;
const OUTPUT_MIN: f32 = 0.0;
const OUTPUT_MAX: f32 = 100.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidParams {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidState {
    pub setpoint: f32,
    pub params: PidParams,
    pub integral: f32,
    pub last_error: f32,
    pub last_time: Tick,
    pub output: DutyCommand,
}

pub struct Pid {
    setpoint: f32,
    params: PidParams,
    integral: MainCtxCell<f32>,
    last_error: MainCtxCell<f32>,
    last_time: MainCtxCell<Tick>,
    output: MainCtxCell<DutyCommand>,
}

impl Pid {
    pub const fn new(setpoint: f32, params: PidParams) -> Self {
        Self {
            setpoint,
            params,
            integral: MainCtxCell::new(0.0),
            last_error: MainCtxCell::new(0.0),
            last_time: MainCtxCell::new(Tick::new()),
            output: MainCtxCell::new(DutyCommand::from_percent(0)),
        }
    }

    pub fn init(&self, m: &MainCtx<'_>, now: Tick) {
        self.last_time.set(m, now);
    }

    /// Lower bound of the integral.
    ///
    /// The integral term alone can pull the output down to zero, but not below.
    #[inline]
    fn integral_min(&self) -> f32 {
        -OUTPUT_BIAS / self.params.ki
    }

    pub fn update(&self, m: &MainCtx<'_>, measured: f32, now: Tick) -> DutyCommand {
        let p = &self.params;

        // deviation
        let e = measured - self.setpoint;
        let dt = elapsed_since(self.last_time.get(m), now).as_secs_f32();
        let de = e - self.last_error.get(m);

        // I term. Only bounded downwards.
        let i = (self.integral.get(m) + e * dt).max(self.integral_min());
        self.integral.set(m, i);

        // D term
        let d = if dt > 0.0 { p.kd * de / dt } else { 0.0 };

        let y = OUTPUT_BIAS + p.kp * e + p.ki * i + d;
        let output = DutyCommand::from_f32(y.max(OUTPUT_MIN).min(OUTPUT_MAX));

        self.last_time.set(m, now);
        self.last_error.set(m, e);
        self.output.set(m, output);

        log::debug!("pid e={e} i={i} y={}", output.percent());
        output
    }

    pub fn state(&self, m: &MainCtx<'_>) -> PidState {
        PidState {
            setpoint: self.setpoint,
            params: self.params,
            integral: self.integral.get(m),
            last_error: self.last_error.get(m),
            last_time: self.last_time.get(m),
            output: self.output.get(m),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::clock::Duration;
    use approx::assert_abs_diff_eq;

    const PARAMS: PidParams = PidParams {
        kp: 2.0,
        ki: 0.02,
        kd: 0.0,
    };

    fn period() -> Duration {
        Duration::from_millis(30_000)
    }

    #[test]
    fn test_steady() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(35.0, PARAMS);
        let mut now = Tick::new();
        pid.init(&m, now);
        for _ in 0..10 {
            now = now + period();
            assert_eq!(pid.update(&m, 35.0, now).percent(), 50);
        }
        assert_eq!(pid.state(&m).integral, 0.0);
    }

    #[test]
    fn test_hot() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(35.0, PARAMS);
        pid.init(&m, Tick::new());
        let y = pid.update(&m, 45.0, Tick::new() + period());
        // 50 + 2 * 10 + 0.02 * (10 * 30)
        assert_eq!(y.percent(), 76);

        let st = pid.state(&m);
        assert_abs_diff_eq!(st.integral, 300.0, epsilon = 0.01);
        assert_abs_diff_eq!(st.last_error, 10.0);
        assert_eq!(st.output, y);
    }

    #[test]
    fn test_output_bounds() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(35.0, PARAMS);
        let mut now = Tick::new();
        pid.init(&m, now);

        now = now + period();
        assert_eq!(pid.update(&m, 1e6, now).percent(), 100);
        now = now + period();
        assert_eq!(pid.update(&m, -1e6, now).percent(), 0);
    }

    #[test]
    fn test_integral_lower_clamp() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(35.0, PARAMS);
        let mut now = Tick::new();
        pid.init(&m, now);
        for _ in 0..100 {
            now = now + period();
            pid.update(&m, 20.0, now);
        }
        assert_abs_diff_eq!(pid.state(&m).integral, -2500.0);

        // Back at the setpoint the integral holds the output at zero.
        now = now + period();
        assert_eq!(pid.update(&m, 35.0, now).percent(), 0);
    }

    #[test]
    fn test_integral_no_upper_clamp() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(35.0, PARAMS);
        let mut now = Tick::new();
        pid.init(&m, now);
        for _ in 0..100 {
            now = now + period();
            pid.update(&m, 50.0, now);
        }
        assert!(pid.state(&m).integral > 40_000.0);
    }

    #[test]
    fn test_derivative() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let pid = Pid::new(
            35.0,
            PidParams {
                kp: 0.0,
                ki: 0.02,
                kd: 60.0,
            },
        );
        pid.init(&m, Tick::new());
        // de = 1 over 30 s: 60 * 1 / 30 = 2, integral 0.02 * 30 = 0.6
        let y = pid.update(&m, 36.0, Tick::new() + period());
        assert_eq!(y.percent(), 52);

        // Zero time step: no derivative.
        let y = pid.update(&m, 36.0, Tick::new() + period());
        assert_eq!(y.percent(), 50);
    }
}

// vim: ts=4 sw=4 expandtab
