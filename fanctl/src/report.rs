// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::actuation::DutyCommand;
use core::fmt;

/// Round a fan speed to the nearest 50 RPM.
#[inline]
pub fn round_rpm(rpm: u32) -> u32 {
    rpm.saturating_add(25) / 50 * 50
}

/// One status line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StatusReport<const N: usize> {
    pub temperature: f32,
    pub rpm: [u32; N],
    pub duty: DutyCommand,
}

impl<const N: usize> fmt::Display for StatusReport<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}C", self.temperature)?;
        for rpm in self.rpm {
            write!(f, " {}", round_rpm(rpm))?;
        }
        write!(f, " {}%", self.duty)
    }
}

/// Receiver of status reports.
///
/// Reporting must not fail the control loop.
/// Implementations drop whatever they can't deliver.
pub trait StatusSink {
    fn report<const N: usize>(&mut self, report: &StatusReport<N>);
}

/// Status sink writing one line per report.
pub struct FmtSink<W> {
    w: W,
}

impl<W: fmt::Write> FmtSink<W> {
    pub const fn new(w: W) -> Self {
        Self { w }
    }

    pub fn inner(&self) -> &W {
        &self.w
    }
}

impl<W: fmt::Write> StatusSink for FmtSink<W> {
    fn report<const N: usize>(&mut self, report: &StatusReport<N>) {
        let _ = write!(self.w, "{report}\r\n");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::string::String;

    #[test]
    fn test_round_rpm() {
        assert_eq!(round_rpm(0), 0);
        assert_eq!(round_rpm(24), 0);
        assert_eq!(round_rpm(26), 50);
        assert_eq!(round_rpm(1208), 1200);
        assert_eq!(round_rpm(1232), 1250);
        assert_eq!(round_rpm(u32::MAX), (u32::MAX / 50) * 50);
    }

    #[test]
    fn test_format() {
        let r = StatusReport {
            temperature: 25.2239,
            rpm: [0, 1208, 1232],
            duty: DutyCommand::from_percent(20),
        };
        let mut sink = FmtSink::new(String::new());
        sink.report(&r);
        sink.report(&r);
        assert_eq!(sink.inner(), "25.2C 0 1200 1250 20%\r\n25.2C 0 1200 1250 20%\r\n");
    }

    #[test]
    fn test_write_error_dropped() {
        struct Full;

        impl fmt::Write for Full {
            fn write_str(&mut self, _s: &str) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let mut sink = FmtSink::new(Full);
        sink.report(&StatusReport {
            temperature: 30.0,
            rpm: [800],
            duty: DutyCommand::MAX,
        });
    }
}

// vim: ts=4 sw=4 expandtab
