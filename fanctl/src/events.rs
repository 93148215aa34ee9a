// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{IrqCtx, MainCtx, Mutex};
use core::cell::Cell;
use portable_atomic::{AtomicU8, Ordering::SeqCst};

/// Periodic tasks that are triggered from interrupt context
/// and executed in the main loop.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Event {
    Temperature = 1 << 0,
    RpmWindow = 1 << 1,
    PidTick = 1 << 2,
}

/// Latched event mask.
pub struct Events {
    mask: AtomicU8,
}

impl Events {
    pub const fn new() -> Self {
        Self {
            mask: AtomicU8::new(0),
        }
    }

    #[inline]
    pub fn raise(&self, _c: &IrqCtx<'_>, ev: Event) {
        self.mask.fetch_or(ev as u8, SeqCst);
    }

    /// Clear the event and return whether it was pending.
    #[inline]
    pub fn take(&self, _m: &MainCtx<'_>, ev: Event) -> bool {
        self.mask.fetch_and(!(ev as u8), SeqCst) & ev as u8 != 0
    }
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

/// Divider for the base rate timer interrupt.
pub struct Periodic {
    period: u32,
    count: Mutex<Cell<u32>>,
}

impl Periodic {
    pub const fn new(period: u32) -> Self {
        assert!(period > 0);
        Self {
            period,
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance by one base tick. Returns true once per period.
    #[inline]
    pub fn tick(&self, c: &IrqCtx<'_>) -> bool {
        let count = self.count.borrow(c.cs());
        let next = count.get() + 1;
        if next >= self.period {
            count.set(0);
            true
        } else {
            count.set(next);
            false
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_events() {
        let ev = Events::new();
        // SAFETY: Test acts as main() and as ISR.
        let (m, c) = unsafe { (MainCtx::new(), IrqCtx::new()) };

        assert!(!ev.take(&m, Event::PidTick));
        ev.raise(&c, Event::PidTick);
        ev.raise(&c, Event::Temperature);
        ev.raise(&c, Event::PidTick);
        assert!(ev.take(&m, Event::PidTick));
        assert!(!ev.take(&m, Event::PidTick));
        assert!(ev.take(&m, Event::Temperature));
        assert!(!ev.take(&m, Event::RpmWindow));
    }

    #[test]
    fn test_periodic() {
        let p = Periodic::new(3);
        // SAFETY: Test acts as ISR.
        let c = unsafe { IrqCtx::new() };
        let fired: std::vec::Vec<bool> = (0..7).map(|_| p.tick(&c)).collect();
        assert_eq!(fired, [false, false, true, false, false, true, false]);

        let p = Periodic::new(1);
        assert!(p.tick(&c));
        assert!(p.tick(&c));
    }
}

// vim: ts=4 sw=4 expandtab
