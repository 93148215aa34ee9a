// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::mutex::{CriticalSection, Mutex};
use core::{cell::Cell, fmt};

/// Byte FIFO shared between the main loop and an interrupt.
pub struct Fifo<const SIZE: usize> {
    buf: [Mutex<Cell<u8>>; SIZE],
    wr: Mutex<Cell<u16>>,
    rd: Mutex<Cell<u16>>,
}

impl<const SIZE: usize> Fifo<SIZE> {
    const MASK: u16 = (SIZE - 1) as u16;

    pub const fn new() -> Self {
        assert!(SIZE.is_power_of_two() && SIZE <= 1 << 15);
        Self {
            buf: [const { Mutex::new(Cell::new(0)) }; SIZE],
            wr: Mutex::new(Cell::new(0)),
            rd: Mutex::new(Cell::new(0)),
        }
    }

    fn count(&self, cs: CriticalSection<'_>) -> usize {
        let wr = self.wr.borrow(cs).get();
        let rd = self.rd.borrow(cs).get();
        wr.wrapping_sub(rd) as usize
    }

    /// Number of bytes that can be inserted.
    pub fn free(&self, cs: CriticalSection<'_>) -> usize {
        SIZE - self.count(cs)
    }

    pub fn is_empty(&self, cs: CriticalSection<'_>) -> bool {
        self.count(cs) == 0
    }

    /// Returns false and drops the byte, if the FIFO is full.
    pub fn insert(&self, cs: CriticalSection<'_>, value: u8) -> bool {
        if self.free(cs) == 0 {
            false
        } else {
            let wr = self.wr.borrow(cs).get();
            self.buf[(wr & Self::MASK) as usize].borrow(cs).set(value);
            self.wr.borrow(cs).set(wr.wrapping_add(1));
            true
        }
    }

    /// Insert all of `data` or nothing.
    ///
    /// Returns false and drops all of `data`, if it doesn't fit.
    pub fn insert_all(&self, cs: CriticalSection<'_>, data: &[u8]) -> bool {
        if data.len() > self.free(cs) {
            return false;
        }
        for &value in data {
            self.insert(cs, value);
        }
        true
    }

    pub fn get(&self, cs: CriticalSection<'_>) -> Option<u8> {
        if self.is_empty(cs) {
            None
        } else {
            let rd = self.rd.borrow(cs).get();
            let value = self.buf[(rd & Self::MASK) as usize].borrow(cs).get();
            self.rd.borrow(cs).set(rd.wrapping_add(1));
            Some(value)
        }
    }
}

impl<const SIZE: usize> Default for Fifo<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Formatting buffer for one line.
///
/// Writing more than `SIZE` bytes fails.
pub struct LineBuf<const SIZE: usize> {
    buf: [u8; SIZE],
    len: usize,
}

impl<const SIZE: usize> LineBuf<SIZE> {
    pub const fn new() -> Self {
        Self {
            buf: [0; SIZE],
            len: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl<const SIZE: usize> Default for LineBuf<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> fmt::Write for LineBuf<SIZE> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > SIZE {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::fmt::Write as _;
    use std::vec::Vec;

    fn drain<const SIZE: usize>(f: &Fifo<SIZE>) -> Vec<u8> {
        critical_section::with(|cs| core::iter::from_fn(|| f.get(cs)).collect())
    }

    #[test]
    fn test_fifo() {
        let f = Fifo::<4>::new();
        critical_section::with(|cs| {
            assert!(f.is_empty(cs));
            assert_eq!(f.free(cs), 4);
            for i in 0..4 {
                assert!(f.insert(cs, i));
            }
            assert!(!f.insert(cs, 4));
            assert_eq!(f.free(cs), 0);
        });
        assert_eq!(drain(&f), [0, 1, 2, 3]);
    }

    #[test]
    fn test_index_wrap() {
        let f = Fifo::<256>::new();
        for round in 0..300_u16 {
            critical_section::with(|cs| {
                assert!(f.insert_all(cs, &[round as u8; 250]));
            });
            let out = drain(&f);
            assert_eq!(out.len(), 250);
            assert!(out.iter().all(|&b| b == round as u8));
        }
    }

    #[test]
    fn test_insert_all_or_nothing() {
        let f = Fifo::<8>::new();
        critical_section::with(|cs| {
            assert!(f.insert_all(cs, b"abcde"));
            assert!(!f.insert_all(cs, b"xyzw"));
            assert_eq!(f.free(cs), 3);
            assert!(f.insert_all(cs, b"fgh"));
            assert!(!f.insert_all(cs, b"i"));
        });
        assert_eq!(drain(&f), b"abcdefgh");
    }

    #[test]
    fn test_line_burst() {
        // Log lines and a status report written back to back
        // before the transmitter drains anything.
        let report = "25.2C 1500 1500 1500 1500 1500 1500 1500 1500 1500 1500 1500 1500 20%\r\n";
        let lines = [
            "DEBUG pid e=-9.8 i=-294.2 d=0.0 y=24.5\r\n",
            "DEBUG temp 25.2 duty 24\r\n",
            report,
            "DEBUG stack 15800\r\n",
        ];
        assert!(lines.iter().map(|l| l.len()).sum::<usize>() > 128);

        let f = Fifo::<256>::new();
        critical_section::with(|cs| {
            for l in lines {
                assert!(f.insert_all(cs, l.as_bytes()));
            }
        });
        let out = drain(&f);
        assert_eq!(out, lines.concat().as_bytes());

        // A full FIFO drops whole lines only.
        let f = Fifo::<128>::new();
        let mut sent = Vec::new();
        critical_section::with(|cs| {
            for l in lines {
                if f.insert_all(cs, l.as_bytes()) {
                    sent.extend_from_slice(l.as_bytes());
                }
            }
        });
        assert_eq!(drain(&f), sent);
        assert!(sent.ends_with(b"\r\n"));
        assert_eq!(sent.iter().filter(|&&b| b == b'\n').count(), 3);
    }

    #[test]
    fn test_line_buf() {
        let mut line = LineBuf::<16>::new();
        assert!(line.as_bytes().is_empty());
        write!(line, "{:.1}C {}%\r\n", 25.22_f32, 20).unwrap();
        assert_eq!(line.as_bytes(), b"25.2C 20%\r\n");

        let mut line = LineBuf::<8>::new();
        assert!(write!(line, "{}", "123456789").is_err());
        assert!(write!(line, "{}", "1234").is_ok());
        assert!(write!(line, "{}", "5678").is_ok());
        assert!(write!(line, "9").is_err());
        assert_eq!(line.as_bytes(), b"12345678");
    }
}

// vim: ts=4 sw=4 expandtab
