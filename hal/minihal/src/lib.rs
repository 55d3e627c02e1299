//! minihal Hardware Abstraction Layer
//!
//! This crate defines the vendor-neutral types and driver traits that the
//! chip-specific HALs (KL25Z, STM32F103) implement. Application code talks
//! to [`gpio::GpioDriver`] and [`timer::TimerDriver`] only, so the same
//! application runs on either target.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (blinky)                   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  minihal (this crate - traits, pools)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ minihal-kl25  │       │ minihal-      │
//! │               │       │   stm32f1     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`gpio`] - Digital I/O parameters and the [`GpioDriver`] trait
//! - [`timer`] - Periodic timer parameters, tick math and the [`TimerDriver`] trait
//! - [`pool`] - Fixed-capacity handle pools shared by every driver
//! - [`contract`] - Fail-fast checks for internal contract violations
//! - [`error`] - Error type shared by all drivers
//!
//! # Features
//!
//! - `defmt` - Derive `defmt::Format` on public types
//! - `test-hooks` - Pool reset hooks and non-halting contract checks for host tests

#![no_std]
#![deny(unsafe_code)]

pub mod contract;
pub mod error;
pub mod gpio;
pub mod pool;
pub mod timer;

// Re-export key types at crate root for convenience
pub use error::{HalError, HalResult};
pub use gpio::{BoundPin, Direction, GpioDriver, GpioParams, Level, Pull};
pub use pool::{Handle, HandlePool};
pub use timer::{Callback, TickClock, TimerDriver, TimerMode, TimerParams};
