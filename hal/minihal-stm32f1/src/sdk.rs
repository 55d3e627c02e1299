//! Vendor SDK seam for the STM32F103 drivers
//!
//! [`GpioSdk`] and [`TimSdk`] follow the shape of the vendor HAL: GPIO init
//! takes a mode/pull/speed description, and the timer base calls report a
//! [`HalStatus`] that the drivers surface as
//! [`HalError::Vendor`](minihal::HalError::Vendor).

use minihal::{HalError, HalResult, Pull};

use crate::pac::Interrupt;
use crate::port::Port;

/// Status returned by the vendor timer calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum HalStatus {
    Ok = 0,
    Error = 1,
    Busy = 2,
    Timeout = 3,
}

impl HalStatus {
    /// Map a non-`Ok` status to [`HalError::Vendor`]
    pub fn into_result(self) -> HalResult<()> {
        match self {
            HalStatus::Ok => Ok(()),
            status => Err(HalError::Vendor(status as u8)),
        }
    }
}

/// Pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioMode {
    Input,
    OutputPushPull,
}

/// Output slew limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioSpeed {
    /// 2 MHz
    Low,
    /// 10 MHz
    Medium,
    /// 50 MHz
    High,
}

/// Settings for one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioInit {
    pub mode: GpioMode,
    pub pull: Pull,
    pub speed: GpioSpeed,
}

impl GpioInit {
    /// Floating or pulled input
    pub fn input(pull: Pull) -> Self {
        Self {
            mode: GpioMode::Input,
            pull,
            speed: GpioSpeed::Low,
        }
    }

    /// Push-pull output limited to 2 MHz
    pub fn output() -> Self {
        Self {
            mode: GpioMode::OutputPushPull,
            pull: Pull::None,
            speed: GpioSpeed::Low,
        }
    }

    /// CNF[1:0] MODE[1:0] nibble for the CRL/CRH register
    pub fn config_nibble(&self) -> u32 {
        match self.mode {
            GpioMode::Input => match self.pull {
                // CNF=01 floating
                Pull::None => 0b0100,
                // CNF=10 pull, direction taken from ODR
                Pull::Up | Pull::Down => 0b1000,
            },
            GpioMode::OutputPushPull => match self.speed {
                GpioSpeed::Medium => 0b0001,
                GpioSpeed::Low => 0b0010,
                GpioSpeed::High => 0b0011,
            },
        }
    }
}

/// GPIO operations
pub trait GpioSdk {
    /// Enable the APB2 clock of a port
    fn enable_clock(&mut self, port: Port);

    /// Configure a pin
    fn init(&mut self, port: Port, pin: u8, init: &GpioInit);

    /// Read the input data bit of a pin
    fn read_pin(&self, port: Port, pin: u8) -> bool;

    /// Set or reset the output data bit of a pin
    fn write_pin(&mut self, port: Port, pin: u8, high: bool);
}

/// General-purpose timer instances used by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Tim {
    Tim3 = 0,
    Tim4 = 1,
}

impl Tim {
    /// Allocation order of the timer driver
    pub const ALL: [Tim; 2] = [Tim::Tim3, Tim::Tim4];

    /// Global interrupt of the instance
    pub fn interrupt(self) -> Interrupt {
        match self {
            Tim::Tim3 => Interrupt::TIM3,
            Tim::Tim4 => Interrupt::TIM4,
        }
    }
}

/// Time base settings applied by [`TimSdk::base_init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimBaseConfig {
    /// PSC value; the counter clock is divided by `prescaler + 1`
    pub prescaler: u16,
    /// ARR value; the counter wraps after `period + 1` ticks
    pub period: u16,
    /// Buffer ARR writes until the next update event
    pub auto_reload_preload: bool,
}

/// Timer operations
pub trait TimSdk {
    /// Frequency of the clock feeding the APB1 timers, in Hz
    fn clock_freq(&self) -> u32;

    /// Enable the APB1 clock of an instance
    fn enable_clock(&mut self, tim: Tim);

    /// Set priority of the instance's NVIC line and unmask it
    fn enable_irq(&mut self, tim: Tim, priority: u8);

    /// Program prescaler and reload, reset the counter
    fn base_init(&mut self, tim: Tim, config: &TimBaseConfig) -> HalStatus;

    /// Enable the update interrupt and start counting
    fn base_start_it(&mut self, tim: Tim) -> HalStatus;

    /// Stop counting and disable the update interrupt
    fn base_stop_it(&mut self, tim: Tim) -> HalStatus;

    /// Acknowledge a pending update event
    fn clear_update_flag(&mut self, tim: Tim);
}
