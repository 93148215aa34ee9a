// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{
    clock::{Duration, Tick, elapsed_since},
    hal::TachInput,
    mutex::{CriticalSection, MainCtx, MainCtxCell, Mutex},
};
use core::cell::Cell;

/// Maximum number of tachometer channels.
pub const MAX_FANS: usize = u16::BITS as usize;

struct FanChannel {
    level: MainCtxCell<bool>,
    last_edge: MainCtxCell<Tick>,
    pulses: Mutex<Cell<u16>>,
    rpm: Mutex<Cell<u32>>,
}

impl FanChannel {
    const fn new() -> Self {
        Self {
            level: MainCtxCell::new(false),
            last_edge: MainCtxCell::new(Tick::new()),
            pulses: Mutex::new(Cell::new(0)),
            rpm: Mutex::new(Cell::new(0)),
        }
    }
}

/// Debounced rising edge counter for `N` fans.
pub struct Tacho<const N: usize> {
    chans: [FanChannel; N],
    debounce: Duration,
    rpm_scale: u32,
}

impl<const N: usize> Tacho<N> {
    pub const fn new(debounce: Duration, rpm_scale: u32) -> Self {
        assert!(N > 0 && N <= MAX_FANS);
        Self {
            chans: [const { FanChannel::new() }; N],
            debounce,
            rpm_scale,
        }
    }

    /// Latch the current input levels as the debounced state.
    pub fn init(&self, m: &MainCtx<'_>, input: &mut impl TachInput, now: Tick) {
        let levels = input.read_levels();
        for (i, ch) in self.chans.iter().enumerate() {
            ch.level.set(m, levels & (1 << i) != 0);
            ch.last_edge.set(m, now);
        }
    }

    pub fn poll(&self, m: &MainCtx<'_>, input: &mut impl TachInput, now: Tick) {
        let levels = input.read_levels();
        for (i, ch) in self.chans.iter().enumerate() {
            let level = levels & (1 << i) != 0;
            if level == ch.level.get(m) {
                continue;
            }
            if elapsed_since(ch.last_edge.get(m), now) <= self.debounce {
                continue;
            }
            ch.level.set(m, level);
            ch.last_edge.set(m, now);
            if level {
                critical_section::with(|cs| {
                    let pulses = ch.pulses.borrow(cs);
                    pulses.set(pulses.get().saturating_add(1));
                });
            }
        }
    }

    /// Convert the pulses of the ended window to RPM and start a new window.
    pub fn compute_rpm_window<'cs>(&self, cs: CriticalSection<'cs>) {
        for ch in &self.chans {
            let pulses = ch.pulses.borrow(cs).replace(0);
            ch.rpm.borrow(cs).set(pulses as u32 * self.rpm_scale);
        }
    }

    pub fn rpm(&self, fan: usize) -> u32 {
        critical_section::with(|cs| self.chans[fan].rpm.borrow(cs).get())
    }

    pub fn rpm_snapshot(&self) -> [u32; N] {
        critical_section::with(|cs| core::array::from_fn(|i| self.chans[i].rpm.borrow(cs).get()))
    }

    pub fn pulses(&self, fan: usize) -> u16 {
        critical_section::with(|cs| self.chans[fan].pulses.borrow(cs).get())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct Levels(u16);

    impl TachInput for Levels {
        fn read_levels(&mut self) -> u16 {
            self.0
        }
    }

    fn ms(ms: u32) -> Tick {
        Tick::new() + Duration::from_micros(ms * 1000)
    }

    fn us(us: u32) -> Tick {
        Tick::new() + Duration::from_micros(us)
    }

    #[test]
    fn test_debounce() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let t = Tacho::<2>::new(Duration::from_micros(1000), 8);
        let mut input = Levels(0);
        t.init(&m, &mut input, Tick::new());

        input.0 = 0b01;
        t.poll(&m, &mut input, ms(2));
        assert_eq!(t.pulses(0), 1);

        // Bounce within the debounce time.
        input.0 = 0b00;
        t.poll(&m, &mut input, us(2500));
        input.0 = 0b01;
        t.poll(&m, &mut input, us(2800));
        assert_eq!(t.pulses(0), 1);

        input.0 = 0b00;
        t.poll(&m, &mut input, ms(4));
        input.0 = 0b01;
        t.poll(&m, &mut input, us(4500));
        assert_eq!(t.pulses(0), 1);
        t.poll(&m, &mut input, us(5500));
        assert_eq!(t.pulses(0), 2);

        assert_eq!(t.pulses(1), 0);
    }

    #[test]
    fn test_exact_threshold_rejected() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let t = Tacho::<1>::new(Duration::from_micros(1000), 8);
        let mut input = Levels(0);
        t.init(&m, &mut input, Tick::new());

        input.0 = 1;
        t.poll(&m, &mut input, us(1000));
        assert_eq!(t.pulses(0), 0);
        t.poll(&m, &mut input, us(1004));
        assert_eq!(t.pulses(0), 1);
    }

    #[test]
    fn test_falling_edge_not_counted() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let t = Tacho::<1>::new(Duration::from_micros(1000), 8);
        let mut input = Levels(1);
        t.init(&m, &mut input, Tick::new());

        input.0 = 0;
        t.poll(&m, &mut input, ms(5));
        assert_eq!(t.pulses(0), 0);
    }

    #[test]
    fn test_debounce_wrap() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let t = Tacho::<1>::new(Duration::from_micros(1000), 8);
        let mut input = Levels(0);
        let start = Tick(u32::MAX - 100);
        t.init(&m, &mut input, start);

        input.0 = 1;
        t.poll(&m, &mut input, start + Duration::from_micros(2000));
        assert_eq!(t.pulses(0), 1);
    }

    #[test]
    fn test_rpm_window() {
        // SAFETY: Test acts as main().
        let m = unsafe { MainCtx::new() };
        let t = Tacho::<3>::new(Duration::from_micros(1000), 8);
        let mut input = Levels(0);
        t.init(&m, &mut input, Tick::new());

        // 5 pulses on fan 1, 2 ms high and 2 ms low each.
        let mut now = 0;
        for _ in 0..5 {
            now += 2;
            input.0 = 0b010;
            t.poll(&m, &mut input, ms(now));
            now += 2;
            input.0 = 0b000;
            t.poll(&m, &mut input, ms(now));
        }
        assert_eq!(t.pulses(1), 5);

        critical_section::with(|cs| t.compute_rpm_window(cs));
        assert_eq!(t.rpm(1), 40);
        assert_eq!(t.pulses(1), 0);
        assert_eq!(t.rpm_snapshot(), [0, 40, 0]);

        critical_section::with(|cs| t.compute_rpm_window(cs));
        assert_eq!(t.rpm_snapshot(), [0, 0, 0]);
    }
}

// vim: ts=4 sw=4 expandtab
