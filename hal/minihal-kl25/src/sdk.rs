//! Vendor SDK seam for the KL25Z drivers
//!
//! The drivers never touch registers themselves. Every hardware side effect
//! goes through [`PortSdk`] or [`TpmSdk`], which mirror the operations of
//! the vendor's peripheral library (clock gating, pin init, pin config,
//! TPM control). [`Kl25Registers`](crate::registers::Kl25Registers)
//! implements them for the real chip.

use minihal::{Direction, Level, Pull};

use crate::port::{GpioBase, Port, PortBase};

/// GPIO block settings for one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioPinConfig {
    pub direction: Direction,
    /// Level driven as soon as an output is enabled
    pub output_logic: Level,
}

/// Pull resistor selection in the PORT block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PullSelect {
    Disabled,
    Down,
    Up,
}

impl From<Pull> for PullSelect {
    fn from(pull: Pull) -> Self {
        match pull {
            Pull::None => PullSelect::Disabled,
            Pull::Up => PullSelect::Up,
            Pull::Down => PullSelect::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlewRate {
    Fast,
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveStrength {
    Low,
    High,
}

/// Pin multiplexer setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum PinMux {
    /// Pin disabled (analog)
    Disabled = 0,
    /// Alternative 1: GPIO
    Gpio = 1,
}

/// PORT block settings for one pin (the PCR register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortPinConfig {
    pub pull: PullSelect,
    pub slew_rate: SlewRate,
    pub passive_filter: bool,
    pub drive_strength: DriveStrength,
    pub mux: PinMux,
}

const PCR_PS: u32 = 1 << 0;
const PCR_PE: u32 = 1 << 1;
const PCR_SRE: u32 = 1 << 2;
const PCR_PFE: u32 = 1 << 4;
const PCR_DSE: u32 = 1 << 6;
const PCR_MUX_SHIFT: u32 = 8;

impl PortPinConfig {
    /// Plain GPIO: slow slew, no filter, low drive
    pub fn gpio(pull: Pull) -> Self {
        Self {
            pull: pull.into(),
            slew_rate: SlewRate::Slow,
            passive_filter: false,
            drive_strength: DriveStrength::Low,
            mux: PinMux::Gpio,
        }
    }

    /// Encode as a PORTx_PCRn value
    pub fn pcr_bits(&self) -> u32 {
        let mut pcr = (self.mux as u32) << PCR_MUX_SHIFT;
        match self.pull {
            PullSelect::Disabled => {}
            PullSelect::Down => pcr |= PCR_PE,
            PullSelect::Up => pcr |= PCR_PE | PCR_PS,
        }
        if self.slew_rate == SlewRate::Slow {
            pcr |= PCR_SRE;
        }
        if self.passive_filter {
            pcr |= PCR_PFE;
        }
        if self.drive_strength == DriveStrength::High {
            pcr |= PCR_DSE;
        }
        pcr
    }
}

/// Pin control and GPIO operations
pub trait PortSdk {
    /// Ungate the clock of a port
    fn enable_clock(&mut self, port: Port);

    /// Set direction (and initial output level) of a pin
    fn gpio_pin_init(&mut self, gpio: GpioBase, pin: u8, config: &GpioPinConfig);

    /// Program the pin control register of a pin
    fn port_set_pin_config(&mut self, port: PortBase, pin: u8, config: &PortPinConfig);

    /// Read the input line of a pin
    fn gpio_read_pin(&self, gpio: GpioBase, pin: u8) -> bool;

    /// Drive an output pin
    fn gpio_write_pin(&mut self, gpio: GpioBase, pin: u8, high: bool);
}

/// TPM base addresses, indexed by instance
pub const TPM_BASES: [usize; 3] = [0x4003_8000, 0x4003_9000, 0x4003_A000];

/// TPM instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Tpm {
    Tpm0 = 0,
    Tpm1 = 1,
    Tpm2 = 2,
}

impl Tpm {
    /// Allocation order of the timer driver
    pub const ALL: [Tpm; 3] = [Tpm::Tpm0, Tpm::Tpm1, Tpm::Tpm2];

    /// Register block base address
    pub fn base(self) -> usize {
        TPM_BASES[self as usize]
    }

    /// NVIC interrupt number
    pub fn irq(self) -> u16 {
        17 + self as u16
    }

    /// Clock gate bit in SIM_SCGC6
    pub fn clock_gate_bit(self) -> u32 {
        24 + self as u32
    }
}

/// TPM counter clock prescaler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TpmPrescale {
    Div1 = 0,
    Div2 = 1,
    Div4 = 2,
    Div8 = 3,
    Div16 = 4,
    Div32 = 5,
    Div64 = 6,
    Div128 = 7,
}

impl TpmPrescale {
    /// Value the input clock is divided by
    pub fn divisor(self) -> u32 {
        1 << self as u32
    }
}

/// TPM settings applied by [`TpmSdk::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TpmConfig {
    pub prescale: TpmPrescale,
    /// Keep counting while the core is halted by a debugger
    pub run_in_debug: bool,
}

/// TPM timer operations
pub trait TpmSdk {
    /// Frequency of the clock selected for the TPMs, in Hz
    fn clock_freq(&self) -> u32;

    /// Select the TPM clock source and ungate the instance
    fn enable_clock(&mut self, tpm: Tpm);

    /// Reset and configure an instance, leaving the counter disabled
    fn init(&mut self, tpm: Tpm, config: &TpmConfig);

    /// Enable the counter overflow interrupt of an instance
    fn enable_overflow_interrupt(&mut self, tpm: Tpm);

    /// Set priority of the instance's NVIC line and unmask it
    fn enable_irq(&mut self, tpm: Tpm, priority: u8);

    /// Disable the counter
    fn stop(&mut self, tpm: Tpm);

    /// Reset the counter to zero
    fn clear_counter(&mut self, tpm: Tpm);

    /// Program the modulo (reload) value
    fn set_period(&mut self, tpm: Tpm, modulo: u16);

    /// Enable the counter
    fn start(&mut self, tpm: Tpm);

    /// Acknowledge a pending overflow
    fn clear_overflow_flag(&mut self, tpm: Tpm);
}
