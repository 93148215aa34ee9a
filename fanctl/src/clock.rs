// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Microseconds per timer tick.
///
/// 16 MHz CPU clock with timer prescaler 64.
pub const TICK_US: u32 = 4;

/// Absolute point in time.
///
/// The counter wraps after 2^32 ticks (about 4 h 46 min).
/// Ordering is decided on the wrapping difference, so two ticks
/// compare correctly as long as they are less than half the range apart.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default)]
pub struct Tick(pub u32);

/// Relative time span in ticks.
#[derive(
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Debug,
    Default,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::Into,
)]
pub struct Duration(pub u32);

impl Tick {
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }
}

impl Duration {
    #[inline]
    pub const fn from_micros(us: u32) -> Self {
        Self(us / TICK_US)
    }

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms * (1000 / TICK_US))
    }

    #[inline]
    pub const fn ticks(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        (self.0 as f32 * TICK_US as f32) / 1_000_000.0
    }
}

impl Ord for Tick {
    #[inline]
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        if self.0 == other.0 {
            core::cmp::Ordering::Equal
        } else if self.0.wrapping_sub(other.0) & (1 << (u32::BITS - 1)) == 0 {
            core::cmp::Ordering::Greater
        } else {
            core::cmp::Ordering::Less
        }
    }
}

impl PartialOrd for Tick {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl core::ops::Add<Duration> for Tick {
    type Output = Self;

    #[inline]
    fn add(self, other: Duration) -> Self::Output {
        Self(self.0.wrapping_add(other.0))
    }
}

impl core::ops::Sub for Tick {
    type Output = Duration;

    #[inline]
    fn sub(self, other: Self) -> Self::Output {
        Duration(self.0.wrapping_sub(other.0))
    }
}

impl From<u32> for Tick {
    #[inline]
    fn from(ticks: u32) -> Self {
        Self(ticks)
    }
}

impl From<Tick> for u32 {
    #[inline]
    fn from(tick: Tick) -> Self {
        tick.0
    }
}

/// Time passed from `reference` to `now`, modulo 2^32 ticks.
#[inline]
pub fn elapsed_since(reference: Tick, now: Tick) -> Duration {
    now - reference
}

/// Check whether `now` has passed the deadline `last`.
///
/// Returns whether it fired and the next deadline.
/// The next deadline is never more than one `period` behind `now`.
pub fn due_time(last: Tick, period: Duration, now: Tick) -> (bool, Tick) {
    if now <= last {
        return (false, last);
    }

    let next = match last.0.checked_add(period.0) {
        Some(next) => Tick(next),
        // Counter wrapped. Restart the schedule from now.
        None => now + period,
    };

    // Missed more than one period. Don't try to catch up.
    if next < now && elapsed_since(next, now) > period {
        (true, now + period)
    } else {
        (true, next)
    }
}


// vim: ts=4 sw=4 expandtab
