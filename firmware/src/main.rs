// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod analog;
mod config;
mod hw;
mod ports;
mod pwm;
mod timer;
mod uart;

use crate::{
    analog::{ADC, Adc},
    config::{CONFIG, FANS, SAMPLES},
    hw::{Peripherals, interrupt, mcu, unwrap_option},
    ports::{PortTachInput, ports_init},
    pwm::{FanPwm, PwmTimers},
    timer::{Clock, base_rate_init},
    uart::{UART, Uart, UartStatus},
};
use fanctl::{PwmChannel, SysPeriph, System, mutex::MainCtx};

pub static SYSTEM: System<FANS, SAMPLES> = System::new(CONFIG);

fn wdt_init() {
    // SAFETY: The asm code only accesses the WDT registers
    //         which are not accessed from anywhere else in the program.
    //         Interrupts are still disabled, so the timed sequence is not interrupted.
    unsafe {
        // Enable WDT with timeout 0.5 s
        core::arch::asm!(
            "wdr",
            "ldi {tmp}, 0x18", // WDCE=1, WDE=1
            "sts {WDTCSR}, {tmp}",
            "ldi {tmp}, 0x0D", // WDE=1, WDP3=0, WDP2=1, WDP1=0, WDP0=1
            "sts {WDTCSR}, {tmp}",
            tmp = out(reg_upper) _,
            WDTCSR = const 0x60,
            options(nostack, preserves_flags)
        );
    }
}

fn wdt_poke(_wp: &mcu::WDT) {
    avr_device::asm::wdr();
}

#[avr_device::entry]
fn main() -> ! {
    wdt_init();

    let dp = unwrap_option(Peripherals::take());

    ports_init(&dp.PORTA, &dp.PORTB, &dp.PORTC, &dp.PORTD);
    base_rate_init(&dp.TC2);

    let pwm_timers = PwmTimers::new(dp.TC1, dp.TC3);

    let mut sp = SysPeriph {
        clock: Clock::new(dp.TC0),
        tach: PortTachInput::new(dp.PORTA, dp.PORTC),
        pwm: PwmChannel::ALL.map(|ch| FanPwm::new(&pwm_timers, ch)),
        status: UartStatus::new(),
    };

    let adc = Adc::new(dp.ADC);
    let uart = Uart::new(dp.USART0);
    let init_static_vars = |ctx| {
        ADC.init(ctx, adc);
        UART.init(ctx, uart);
    };

    // # SAFETY
    //
    // This is the context handle for the main() function.
    // Holding a reference to this object proves that the holder
    // is running in main() context.
    let m = unsafe { MainCtx::new_with_init(init_static_vars) };

    #[cfg(feature = "debug")]
    uart::logger_init();

    SYSTEM.init(&m, &mut sp);
    log::debug!("fanctl up");

    // SAFETY: This must be after construction of MainCtx
    //         and after initialization of static MainInit variables.
    unsafe { interrupt::enable() };

    loop {
        SYSTEM.run(&m, &mut sp);
        UART.main(&m).kick(&m);
        wdt_poke(&dp.WDT);
    }
}

// vim: ts=4 sw=4 expandtab
