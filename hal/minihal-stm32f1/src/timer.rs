//! Periodic timers on STM32F103 TIM3 and TIM4
//!
//! Both timers count the APB1 timer clock divided by 1024. The time base
//! is programmed on every start, so a restart always runs a full period.

use minihal::{
    contract_check, Callback, HalError, HalResult, Handle, HandlePool, TickClock, TimerDriver,
    TimerParams,
};

use crate::sdk::{Tim, TimBaseConfig, TimSdk};

/// Timers the driver can hand out unless configured otherwise
pub const DEFAULT_TIMER_CAPACITY: usize = 2;

/// Counter clock divisor
pub const PRESCALER: u32 = 1024;

/// NVIC priority of the timer interrupts (lowest with 4 priority bits)
pub const IRQ_PRIORITY: u8 = 15;

const COUNTER_BITS: u8 = 16;

/// Pool entry of a claimed timer
#[derive(Debug, Clone, Copy)]
pub struct TimerEntry {
    tim: Tim,
    clock: TickClock,
    callback: Option<Callback>,
}

/// Opaque handle to a claimed timer
pub type TimerHandle = Handle<TimerEntry>;

/// STM32F103 timer driver with room for `N` timers
pub struct Stm32Timer<S, const N: usize = DEFAULT_TIMER_CAPACITY> {
    sdk: S,
    timers: HandlePool<TimerEntry, N>,
}

impl<S: TimSdk, const N: usize> Stm32Timer<S, N> {
    /// Create a driver with no timers claimed
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
    pub fn instance(&self, timer: TimerHandle) -> Option<Tim> {
        self.timers.get(timer).map(|entry| entry.tim)
    }

    /// Longest accepted period of a timer, exclusive, in milliseconds
    pub fn max_period_ms(&self, timer: TimerHandle) -> Option<u32> {
        self.timers.get(timer).map(|entry| entry.clock.max_period_ms())
    }

    /// Forget all timers (host tests only)
    ///
    /// Running timers keep counting.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&mut self) {
        self.timers.reset();
    }

    /// Acknowledge an update event of `tim` and return its callback
    ///
    /// See [`on_interrupt`](Self::on_interrupt) for the lock-free variant.
    pub fn take_expired(&mut self, tim: Tim) -> Option<Callback> {
        self.sdk.clear_update_flag(tim);

        let entry = self.timers.iter().find(|(_, entry)| entry.tim == tim);
        contract_check!(entry.is_some());
        entry.and_then(|(_, entry)| entry.callback)
    }

    /// Interrupt service for `tim`
    pub fn on_interrupt(&mut self, tim: Tim) {
        if let Some(callback) = self.take_expired(tim) {
            callback();
        }
    }
}

impl<S: TimSdk, const N: usize> TimerDriver for Stm32Timer<S, N> {
    type Timer = TimerHandle;

    fn init(&mut self, params: &TimerParams) -> HalResult<TimerHandle> {
        params.validate()?;
        if let Err(e) = self.timers.ensure_free() {
            #[cfg(feature = "defmt")]
            defmt::warn!("timer pool full ({=usize} timers)", N);
            return Err(e);
        }
        let tim = *Tim::ALL
            .get(self.timers.len())
            .ok_or(HalError::PoolExhausted)?;

        let clock = TickClock::new(self.sdk.clock_freq(), PRESCALER, COUNTER_BITS)?;

        // The time base itself is programmed by `start`
        self.sdk.enable_clock(tim);
        self.sdk.enable_irq(tim, IRQ_PRIORITY);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "{} ready, {=u32} Hz input, max period {=u32} ms",
            tim,
            clock.input_hz(),
            clock.max_period_ms()
        );

        self.timers.claim(TimerEntry {
            tim,
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
        let config = TimBaseConfig {
            prescaler: (PRESCALER - 1) as u16,
            period: u16::try_from(reload).map_err(|_| HalError::PeriodOutOfRange)?,
            auto_reload_preload: true,
        };
        let tim = entry.tim;

        self.sdk.base_stop_it(tim).into_result()?;
        self.sdk.base_init(tim, &config).into_result().inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} base init failed: {}", tim, _e);
        })?;
        entry.callback = Some(callback);
        self.sdk.base_start_it(tim).into_result()
    }
}
