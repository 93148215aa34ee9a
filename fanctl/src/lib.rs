// -*- coding: utf-8 -*-
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coolant temperature and fan speed control core.
//!
//! Everything in here is hardware independent.
//! The firmware provides the hardware through the traits in [hal]
//! and drives a single `static` [System] from its interrupt handlers
//! and from its main loop.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod actuation;
pub mod clock;
pub mod config;
pub mod events;
pub mod fifo;
pub mod hal;
pub mod mutex;
pub mod pid;
pub mod report;
pub mod ring;
pub mod system;
pub mod tacho;
pub mod temp;

pub use crate::{
    actuation::{DutyCommand, PWM_CHANNELS, PwmChannel},
    clock::{Duration, Tick},
    config::Config,
    system::{SysPeriph, System},
};

// vim: ts=4 sw=4 expandtab
