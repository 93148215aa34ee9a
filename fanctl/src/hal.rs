// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hardware capabilities needed by the controller.

use crate::clock::Tick;
use embedded_hal::digital::InputPin;

/// Monotonic free running time base.
pub trait TickSource {
    fn now(&self) -> Tick;
}

/// Single shot analog conversion.
pub trait AnalogInput {
    fn read_raw(&mut self) -> u16;
}

/// Snapshot of all tachometer input levels.
///
/// Bit n is the level of fan n.
pub trait TachInput {
    fn read_levels(&mut self) -> u16;
}

/// Tachometer input over individual `embedded-hal` pins.
///
/// A pin that fails to read keeps its previous level.
pub struct PinTachInput<P, const N: usize> {
    pins: [P; N],
    last: u16,
}

impl<P: InputPin, const N: usize> PinTachInput<P, N> {
    pub const fn new(pins: [P; N]) -> Self {
        assert!(N <= u16::BITS as usize);
        Self { pins, last: 0 }
    }
}

impl<P: InputPin, const N: usize> TachInput for PinTachInput<P, N> {
    fn read_levels(&mut self) -> u16 {
        let mut levels = self.last;
        for (i, pin) in self.pins.iter_mut().enumerate() {
            match pin.is_high() {
                Ok(true) => levels |= 1 << i,
                Ok(false) => levels &= !(1 << i),
                Err(_) => (),
            }
        }
        self.last = levels;
        levels
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use core::{cell::Cell, convert::Infallible};
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::rc::Rc;

    #[derive(Debug)]
    struct PinError;

    impl embedded_hal::digital::Error for PinError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct MockPin {
        level: Rc<Cell<Option<bool>>>,
    }

    impl ErrorType for MockPin {
        type Error = PinError;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            self.level.get().ok_or(PinError)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            self.is_high().map(|l| !l)
        }
    }

    #[test]
    fn test_pin_levels() {
        let levels: [Rc<Cell<Option<bool>>>; 3] = Default::default();
        let pins = [0, 1, 2].map(|i| MockPin {
            level: Rc::clone(&levels[i]),
        });
        let mut input = PinTachInput::new(pins);

        levels[0].set(Some(true));
        levels[1].set(Some(false));
        levels[2].set(Some(true));
        assert_eq!(input.read_levels(), 0b101);

        // Failed read keeps the last level.
        levels[0].set(None);
        levels[2].set(Some(false));
        assert_eq!(input.read_levels(), 0b001);

        levels[0].set(Some(false));
        levels[1].set(None);
        assert_eq!(input.read_levels(), 0b000);
    }

    #[test]
    fn test_infallible_pins() {
        struct High;

        impl ErrorType for High {
            type Error = Infallible;
        }

        impl InputPin for High {
            fn is_high(&mut self) -> Result<bool, Infallible> {
                Ok(true)
            }

            fn is_low(&mut self) -> Result<bool, Infallible> {
                Ok(false)
            }
        }

        let mut input = PinTachInput::new([High, High, High, High]);
        assert_eq!(input.read_levels(), 0xF);
    }
}

// vim: ts=4 sw=4 expandtab
