//! Periodic timer abstractions
//!
//! Provides the parameters, tick arithmetic and driver trait for hardware
//! timers that call back into the application every time they expire.

use crate::error::{HalError, HalResult};

/// Function invoked from interrupt context when a timer expires
///
/// Callbacks must be short and must not block.
pub type Callback = fn();

/// Timer operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    /// Expire every period until restarted
    Periodic,
    /// Expire once (not supported by the current targets)
    OneShot,
}

/// Everything needed to initialize a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerParams {
    pub mode: TimerMode,
}

impl TimerParams {
    /// Parameters for a periodic timer
    pub const fn periodic() -> Self {
        Self {
            mode: TimerMode::Periodic,
        }
    }

    /// Check the mode is one the drivers implement
    pub fn validate(&self) -> HalResult<()> {
        match self.mode {
            TimerMode::Periodic => Ok(()),
            TimerMode::OneShot => Err(HalError::NotSupported),
        }
    }
}

/// Timer input clock and counter geometry
///
/// Converts millisecond periods to counter ticks:
///
/// ```text
/// ticks = period_ms * input_hz / (prescaler * 1000)
/// ```
///
/// all in integer arithmetic. The longest period is the one that fills the
/// counter completely, computed once when the clock is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickClock {
    input_hz: u32,
    prescaler: u32,
    max_period_ms: u32,
}

/// Fewest ticks in a period
///
/// A reload of 0 stalls the counter (no update event on STM32 TIMx, and a
/// degenerate overflow on KL25 TPMs), so periods never go below two ticks.
pub const MIN_TICKS: u32 = 2;

impl TickClock {
    /// Build a tick clock
    ///
    /// # Arguments
    /// - `input_hz`: Frequency feeding the prescaler
    /// - `prescaler`: Fixed divisor applied before counting
    /// - `counter_bits`: Width of the counter (at most 32)
    ///
    /// Fails with [`HalError::ClockUnavailable`] if the input clock or the
    /// prescaler is zero.
    pub fn new(input_hz: u32, prescaler: u32, counter_bits: u8) -> HalResult<Self> {
        if input_hz == 0 || prescaler == 0 {
            return Err(HalError::ClockUnavailable);
        }

        let counts = 1u64 << counter_bits.min(32);
        let max_ms = counts * prescaler as u64 * 1000 / input_hz as u64;

        Ok(Self {
            input_hz,
            prescaler,
            max_period_ms: max_ms.min(u32::MAX as u64) as u32,
        })
    }

    /// Frequency feeding the prescaler
    pub fn input_hz(&self) -> u32 {
        self.input_hz
    }

    /// Counter frequency after the prescaler
    pub fn tick_hz(&self) -> u32 {
        self.input_hz / self.prescaler
    }

    /// Exclusive upper bound for periods, in milliseconds
    pub fn max_period_ms(&self) -> u32 {
        self.max_period_ms
    }

    /// Number of ticks in `period_ms`
    ///
    /// Fails with [`HalError::PeriodOutOfRange`] for a zero period or one at
    /// or above [`max_period_ms`](Self::max_period_ms). Shorter periods
    /// round up to [`MIN_TICKS`], so the reload value is never zero.
    pub fn ticks_for(&self, period_ms: u32) -> HalResult<u32> {
        if period_ms == 0 || period_ms >= self.max_period_ms {
            return Err(HalError::PeriodOutOfRange);
        }

        let ticks = period_ms as u64 * self.input_hz as u64 / (self.prescaler as u64 * 1000);
        Ok(ticks.max(MIN_TICKS as u64) as u32)
    }

    /// Counter reload value for `period_ms` (ticks - 1)
    pub fn reload_for(&self, period_ms: u32) -> HalResult<u32> {
        self.ticks_for(period_ms).map(|ticks| ticks - 1)
    }
}

/// Periodic timer driver implemented by each target
///
/// A driver owns a fixed pool of timer peripherals. The interrupt side is
/// target-specific: each HAL exposes an `on_interrupt` entry point that the
/// firmware calls from the vector for that peripheral.
pub trait TimerDriver {
    /// Opaque timer handle
    type Timer: Copy;

    /// Claim and prepare the next free timer peripheral
    fn init(&mut self, params: &TimerParams) -> HalResult<Self::Timer>;

    /// Start (or restart) counting
    ///
    /// The timer is stopped, its counter cleared and `callback` registered
    /// before counting resumes, so a restart always runs a full period.
    fn start(&mut self, timer: Self::Timer, period_ms: u32, callback: Callback) -> HalResult<()>;
}
