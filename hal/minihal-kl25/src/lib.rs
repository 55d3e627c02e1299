//! NXP KL25Z HAL for minihal
//!
//! This crate implements the `minihal` driver traits for the KL25Z
//! (Cortex-M0+) as found on the FRDM-KL25Z board:
//!
//! - [`gpio::Kl25Gpio`] - PORT pin mux + GPIO digital I/O
//! - [`timer::Kl25Timer`] - TPM0..TPM2 as periodic timers
//! - [`board`] - Clock bring-up for the timers
//!
//! Drivers talk to the silicon through the [`sdk`] traits. On target the
//! [`registers::Kl25Registers`] backend implements them with volatile
//! register access; host tests substitute a mock.
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting and driver logging
//! - `test-hooks` - Expose `reset()` on the drivers

#![no_std]

pub mod board;
pub mod gpio;
pub mod port;
pub mod registers;
pub mod sdk;
pub mod timer;

mod mmio;

#[cfg(test)]
mod mock;

pub use gpio::{Kl25Gpio, PinHandle};
pub use port::Port;
pub use registers::Kl25Registers;
pub use timer::{Kl25Timer, TimerHandle};

// Re-export shared types from minihal
pub use minihal::{GpioDriver, GpioParams, HalError, Level, TimerDriver, TimerParams};
