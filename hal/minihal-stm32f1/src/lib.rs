//! STM32F103 HAL for minihal
//!
//! This crate implements the `minihal` driver traits for the STM32F103
//! (Cortex-M3), e.g. the "Blue Pill" board:
//!
//! - [`gpio::Stm32Gpio`] - GPIOA..GPIOE digital I/O
//! - [`timer::Stm32Timer`] - TIM3 and TIM4 as periodic timers
//! - [`board`] - Clock tree discovery
//!
//! Drivers talk to the silicon through the [`sdk`] traits, shaped after the
//! vendor HAL calls (including its status codes). On target the
//! [`registers::Stm32Registers`] backend implements them on the `stm32f1`
//! PAC (re-exported as [`pac`]); host tests substitute a mock.
//!
//! # Features
//!
//! - `defmt` - Enable debug formatting and driver logging
//! - `rt` - Let the PAC provide the interrupt vector table
//! - `test-hooks` - Expose `reset()` on the drivers

#![no_std]

pub mod board;
pub mod gpio;
pub mod port;
pub mod registers;
pub mod sdk;
pub mod timer;

#[cfg(test)]
mod mock;

pub use stm32f1::stm32f103 as pac;

pub use gpio::{PinHandle, Stm32Gpio};
pub use port::Port;
pub use registers::Stm32Registers;
pub use timer::{Stm32Timer, TimerHandle};

// Re-export shared types from minihal
pub use minihal::{GpioDriver, GpioParams, HalError, Level, TimerDriver, TimerParams};
