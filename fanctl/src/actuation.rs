// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{MainCtx, MainCtxCell};
use embedded_hal::pwm::{Error as _, SetDutyCycle};

pub const PWM_CHANNELS: usize = 3;

/// Fan duty cycle in percent, 0 to 100.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DutyCommand(u8);

impl DutyCommand {
    pub const MAX: Self = Self(100);

    /// Values above 100 saturate.
    #[inline]
    pub const fn from_percent(percent: u8) -> Self {
        if percent > Self::MAX.0 {
            Self::MAX
        } else {
            Self(percent)
        }
    }

    /// Truncates the fraction. Negative and NaN give 0.
    #[inline]
    pub fn from_f32(percent: f32) -> Self {
        Self::from_percent(percent as u8)
    }

    #[inline]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl core::fmt::Display for DutyCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fan groups. Each group of four fans shares one PWM output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PwmChannel {
    TopRadiator = 0,
    BottomRadiatorTop = 1,
    BottomRadiatorBottom = 2,
}

impl PwmChannel {
    pub const ALL: [PwmChannel; PWM_CHANNELS] = [
        PwmChannel::TopRadiator,
        PwmChannel::BottomRadiatorTop,
        PwmChannel::BottomRadiatorBottom,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

pub struct Actuation {
    min_duty: DutyCommand,
    applied: [MainCtxCell<DutyCommand>; PWM_CHANNELS],
}

impl Actuation {
    pub const fn new(min_duty: DutyCommand) -> Self {
        Self {
            min_duty,
            applied: [const { MainCtxCell::new(DutyCommand(0)) }; PWM_CHANNELS],
        }
    }

    /// Raise the command to the safe minimum.
    #[inline]
    pub fn clamp(&self, cmd: DutyCommand) -> DutyCommand {
        cmd.max(self.min_duty)
    }

    /// Set all channels to the same duty cycle.
    pub fn apply_duty<P: SetDutyCycle>(
        &self,
        m: &MainCtx<'_>,
        pwm: &mut [P; PWM_CHANNELS],
        cmd: DutyCommand,
    ) -> DutyCommand {
        let duty = self.clamp(cmd);
        for ch in PwmChannel::ALL {
            self.apply_channel(m, pwm, ch, duty);
        }
        duty
    }

    pub fn apply_channel<P: SetDutyCycle>(
        &self,
        m: &MainCtx<'_>,
        pwm: &mut [P; PWM_CHANNELS],
        ch: PwmChannel,
        cmd: DutyCommand,
    ) -> DutyCommand {
        let duty = self.clamp(cmd);
        if let Err(e) = pwm[ch.index()].set_duty_cycle_percent(duty.percent()) {
            log::warn!("pwm {ch:?}: {:?}", e.kind());
        }
        self.applied[ch.index()].set(m, duty);
        duty
    }

    pub fn applied(&self, m: &MainCtx<'_>, ch: PwmChannel) -> DutyCommand {
        self.applied[ch.index()].get(m)
    }

    pub fn min_duty(&self) -> DutyCommand {
        self.min_duty
    }
}


// vim: ts=4 sw=4 expandtab
