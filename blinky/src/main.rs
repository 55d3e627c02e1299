//! Blinky - minihal sample firmware
//!
//! Blinks the board LED from a periodic timer. Each press of the board
//! button switches to the next blink period from blinky.toml.
//!
//! Build for one target at a time:
//!
//! ```text
//! cargo build -p blinky --features kl25 --target thumbv6m-none-eabi
//! cargo build -p blinky --features stm32f103 --target thumbv7m-none-eabi
//! ```

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

mod apps;
mod config;
mod os;
mod platform;

#[cfg(all(not(test), feature = "defmt"))]
use {defmt_rtt as _, panic_probe as _};

/// Main entry point
#[cfg(not(test))]
#[cortex_m_rt::entry]
fn main() -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("blinky starting on {=str}", platform::NAME);

    platform::init();

    if let Err(_e) = apps::led::init() {
        #[cfg(feature = "defmt")]
        defmt::error!("LED app failed to start: {}", _e);
    }
    if let Err(_e) = apps::button::init() {
        #[cfg(feature = "defmt")]
        defmt::error!("button app failed to start: {}", _e);
    }

    os::kernel_start(idle)
}

/// Runs between interrupts
#[cfg(not(test))]
fn idle() {}
