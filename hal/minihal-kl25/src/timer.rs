//! Periodic timers on the KL25Z TPM modules
//!
//! TPM0, TPM1 and TPM2 are handed out in that order. Each counts the
//! selected TPM clock divided by 128 and raises its overflow interrupt when
//! the 16-bit counter reaches the programmed modulo.

use minihal::{
    contract_check, Callback, HalError, HalResult, Handle, HandlePool, TickClock, TimerDriver,
    TimerParams,
};

use crate::sdk::{Tpm, TpmConfig, TpmPrescale, TpmSdk};

/// Timers the driver can hand out unless configured otherwise
pub const DEFAULT_TIMER_CAPACITY: usize = 3;

/// Fixed prescaler applied to every TPM
pub const PRESCALE: TpmPrescale = TpmPrescale::Div128;

/// NVIC priority of the TPM interrupts (lowest on Cortex-M0+)
pub const IRQ_PRIORITY: u8 = 3;

const COUNTER_BITS: u8 = 16;

/// Driver-side record of a claimed TPM
#[derive(Debug, Clone, Copy)]
pub struct TimerEntry {
    tpm: Tpm,
    clock: TickClock,
    callback: Option<Callback>,
}

/// Opaque handle to a claimed TPM
pub type TimerHandle = Handle<TimerEntry>;

/// KL25Z TPM timer driver with room for `N` timers
pub struct Kl25Timer<S, const N: usize = DEFAULT_TIMER_CAPACITY> {
    sdk: S,
    timers: HandlePool<TimerEntry, N>,
}

impl<S: TpmSdk, const N: usize> Kl25Timer<S, N> {
    /// Create a driver with an empty pool
    pub const fn new(sdk: S) -> Self {
        Self {
            sdk,
            timers: HandlePool::new(),
        }
    }

    /// Number of timers claimed so far
    pub fn allocated(&self) -> usize {
        self.timers.len()
    }

    /// Peripheral behind a handle
    pub fn instance(&self, timer: TimerHandle) -> Option<Tpm> {
        self.timers.get(timer).map(|entry| entry.tpm)
    }

    /// Longest accepted period of a timer, exclusive, in milliseconds
    pub fn max_period_ms(&self, timer: TimerHandle) -> Option<u32> {
        self.timers.get(timer).map(|entry| entry.clock.max_period_ms())
    }

    /// Forget every claimed timer
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&mut self) {
        self.timers.reset();
    }

    /// Acknowledge an overflow of `tpm` and return the registered callback
    ///
    /// Meant to run inside the critical section that guards the driver. The
    /// callback is returned rather than invoked so the caller can release
    /// the lock first.
    pub fn take_expired(&mut self, tpm: Tpm) -> Option<Callback> {
        self.sdk.clear_overflow_flag(tpm);

        let entry = self.timers.iter().find(|(_, entry)| entry.tpm == tpm);
        contract_check!(entry.is_some());
        entry.and_then(|(_, entry)| entry.callback)
    }

    /// Interrupt service for `tpm`: acknowledge and run the callback
    pub fn on_interrupt(&mut self, tpm: Tpm) {
        if let Some(callback) = self.take_expired(tpm) {
            callback();
        }
    }
}

impl<S: TpmSdk, const N: usize> TimerDriver for Kl25Timer<S, N> {
    type Timer = TimerHandle;

    fn init(&mut self, params: &TimerParams) -> HalResult<TimerHandle> {
        params.validate()?;
        if let Err(e) = self.timers.ensure_free() {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer pool full ({=usize} timers)", N);
            return Err(e);
        }
        let tpm = *Tpm::ALL
            .get(self.timers.len())
            .ok_or(HalError::PoolExhausted)?;

        let clock = TickClock::new(self.sdk.clock_freq(), PRESCALE.divisor(), COUNTER_BITS)?;

        self.sdk.enable_clock(tpm);
        self.sdk.init(
            tpm,
            &TpmConfig {
                prescale: PRESCALE,
                run_in_debug: false,
            },
        );
        self.sdk.enable_overflow_interrupt(tpm);
        self.sdk.enable_irq(tpm, IRQ_PRIORITY);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{} ready, {=u32} Hz tick, max period {=u32} ms",
            tpm,
            clock.tick_hz(),
            clock.max_period_ms()
        );

        self.timers.claim(TimerEntry {
            tpm,
            clock,
            callback: None,
        })
    }

    fn start(&mut self, timer: TimerHandle, period_ms: u32, callback: Callback) -> HalResult<()> {
        let entry = self
            .timers
            .get_mut(timer)
            .ok_or(HalError::InvalidParameter)?;

        let reload = entry.clock.reload_for(period_ms)?;
        let modulo = u16::try_from(reload).map_err(|_| HalError::PeriodOutOfRange)?;
        let tpm = entry.tpm;

        self.sdk.stop(tpm);
        self.sdk.clear_counter(tpm);
        self.sdk.set_period(tpm, modulo);
        entry.callback = Some(callback);
        self.sdk.start(tpm);

        Ok(())
    }
}
