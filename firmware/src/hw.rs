// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

pub use atmega::{self as mcu, Peripherals};
pub use avr_device::atmega1284p as atmega;
pub use avr_device::interrupt;

use fanctl::mutex::IrqCtx;

macro_rules! define_isr {
    ($name:ident, $handler:path) => {
        #[avr_device::interrupt(atmega1284p)]
        fn $name() {
            // SAFETY: We are inside of an interrupt handler.
            // Therefore, it is safe to construct an `IrqCtx`.
            let c = unsafe { IrqCtx::new() };
            $handler(&c);
        }
    };
}

define_isr!(TIMER0_OVF, crate::timer::irq_handler_timer0_ovf);
define_isr!(TIMER2_COMPA, crate::timer::irq_handler_timer2_compa);
define_isr!(USART0_UDRE, crate::uart::irq_handler_usart0_udre);

/// Cheaper Option::unwrap() alternative.
///
/// This is cheaper, because it doesn't call into the panic unwind path.
/// Therefore, it does not impose caller-saves overhead onto the calling function.
#[inline(always)]
pub fn unwrap_option<T>(value: Option<T>) -> T {
    match value {
        Some(value) => value,
        None => reset_system(),
    }
}

/// Reset the system.
#[inline(always)]
#[allow(clippy::empty_loop)]
pub fn reset_system() -> ! {
    loop {
        // Wait for the watchdog timer to trigger and reset the system.
        // We don't need to disable interrupts here.
        // No interrupt will reset the watchdog timer.
    }
}

#[inline(always)]
#[panic_handler]
fn panic(_: &core::panic::PanicInfo) -> ! {
    reset_system();
}

// vim: ts=4 sw=4 expandtab
