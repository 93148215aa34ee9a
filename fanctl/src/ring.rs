// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{CriticalSection, Mutex};
use core::cell::Cell;

/// Fixed capacity buffer that always holds the latest `SIZE` samples.
///
/// Writes overwrite the oldest slot.
/// The buffer starts out completely filled with a default sample.
pub struct RollingBuffer<const SIZE: usize> {
    buf: [Mutex<Cell<u16>>; SIZE],
    wr: Mutex<Cell<u8>>,
}

impl<const SIZE: usize> RollingBuffer<SIZE> {
    pub const fn new(prefill: u16) -> Self {
        assert!(SIZE > 0 && SIZE <= u8::MAX as usize);

        let mut buf = [const { Mutex::new(Cell::new(0)) }; SIZE];
        let mut i = 0;
        while i < SIZE {
            buf[i] = Mutex::new(Cell::new(prefill));
            i += 1;
        }
        Self {
            buf,
            wr: Mutex::new(Cell::new(0)),
        }
    }

    pub fn push<'cs>(&self, cs: CriticalSection<'cs>, value: u16) {
        let wr = self.wr.borrow(cs).get() as usize;
        self.buf[wr].borrow(cs).set(value);
        let wr = if wr + 1 >= SIZE { 0 } else { wr + 1 };
        self.wr.borrow(cs).set(wr as u8);
    }

    pub fn sum<'cs>(&self, cs: CriticalSection<'cs>) -> u32 {
        self.buf.iter().map(|s| s.borrow(cs).get() as u32).sum()
    }

    pub fn average<'cs>(&self, cs: CriticalSection<'cs>) -> f32 {
        self.sum(cs) as f32 / SIZE as f32
    }
}


// vim: ts=4 sw=4 expandtab
