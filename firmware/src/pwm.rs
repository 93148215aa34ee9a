// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::hw::mcu;
use core::convert::Infallible;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use fanctl::PwmChannel;

/// PWM TOP value.
/// 16 MHz / (639 + 1) = 25 kHz
const PWM_TOP: u16 = 639;

/// Timers 1 and 3 in fast PWM mode 14 (TOP = ICRn).
#[allow(non_snake_case)]
pub struct PwmTimers {
    TC1: mcu::TC1,
    TC3: mcu::TC3,
}

impl PwmTimers {
    #[rustfmt::skip]
    pub fn new(tc1: mcu::TC1, tc3: mcu::TC3) -> Self {
        tc1.ocr1a().write(|w| w.set(0));
        tc1.ocr1b().write(|w| w.set(0));
        tc1.icr1().write(|w| w.set(PWM_TOP));
        tc1.tccr1a().write(|w| {
            w.set(
                0x80 | // COM1A1: clear OC1A on match
                0x20 | // COM1B1: clear OC1B on match
                0x02, // WGM11
            )
        });
        tc1.tccr1b().write(|w| {
            w.set(
                0x10 | // WGM13
                0x08 | // WGM12
                0x01, // CS: 1
            )
        });

        tc3.ocr3a().write(|w| w.set(0));
        tc3.icr3().write(|w| w.set(PWM_TOP));
        tc3.tccr3a().write(|w| {
            w.set(
                0x80 | // COM3A1: clear OC3A on match
                0x02, // WGM31
            )
        });
        tc3.tccr3b().write(|w| {
            w.set(
                0x10 | // WGM33
                0x08 | // WGM32
                0x01, // CS: 1
            )
        });

        Self { TC1: tc1, TC3: tc3 }
    }
}

/// One fan group output.
pub struct FanPwm<'a> {
    timers: &'a PwmTimers,
    ch: PwmChannel,
}

impl<'a> FanPwm<'a> {
    pub fn new(timers: &'a PwmTimers, ch: PwmChannel) -> Self {
        Self { timers, ch }
    }
}

impl ErrorType for FanPwm<'_> {
    type Error = Infallible;
}

impl SetDutyCycle for FanPwm<'_> {
    fn max_duty_cycle(&self) -> u16 {
        PWM_TOP
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(PWM_TOP);
        let t = self.timers;
        match self.ch {
            PwmChannel::TopRadiator => t.TC1.ocr1a().write(|w| w.set(duty)),
            PwmChannel::BottomRadiatorTop => t.TC1.ocr1b().write(|w| w.set(duty)),
            PwmChannel::BottomRadiatorBottom => t.TC3.ocr3a().write(|w| w.set(duty)),
        }
        Ok(())
    }
}

// vim: ts=4 sw=4 expandtab
