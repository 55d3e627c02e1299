//! Button application
//!
//! Samples the board button from a periodic timer, debounces it, and on
//! every press switches the LED to the next configured blink period.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use minihal::{GpioDriver, GpioParams, HalError, HalResult, Level, TimerDriver, TimerParams};
use portable_atomic::{AtomicU32, Ordering};

use super::led;
use crate::config;
use crate::platform::{self, Pin};

/// Accepts a new level after `threshold` identical consecutive samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    stable: Level,
    candidate: Level,
    count: u8,
    threshold: u8,
}

impl Debouncer {
    pub const fn new(initial: Level, threshold: u8) -> Self {
        Self {
            stable: initial,
            candidate: initial,
            count: 0,
            threshold: if threshold == 0 { 1 } else { threshold },
        }
    }

    /// Last accepted level
    pub fn stable(&self) -> Level {
        self.stable
    }

    /// Feed one raw sample; returns the new level when it is accepted
    pub fn sample(&mut self, raw: Level) -> Option<Level> {
        if raw == self.stable {
            self.candidate = raw;
            self.count = 0;
            return None;
        }

        if raw == self.candidate {
            self.count = self.count.saturating_add(1);
        } else {
            self.candidate = raw;
            self.count = 1;
        }

        if self.count >= self.threshold {
            self.stable = raw;
            self.count = 0;
            Some(raw)
        } else {
            None
        }
    }
}

/// Endless walk through a list of blink periods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodCycle<const N: usize> {
    periods: Vec<u32, N>,
    index: usize,
}

impl<const N: usize> PeriodCycle<N> {
    /// Fails if `periods` is empty or longer than `N`
    pub fn new(periods: &[u32]) -> Option<Self> {
        if periods.is_empty() {
            return None;
        }
        let periods = Vec::from_slice(periods).ok()?;
        Some(Self { periods, index: 0 })
    }

    pub fn current(&self) -> u32 {
        self.periods[self.index]
    }

    /// Move to the next period, wrapping after the last one
    pub fn advance(&mut self) -> u32 {
        self.index = (self.index + 1) % self.periods.len();
        self.current()
    }
}

/// Debounced button that selects blink periods
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    debouncer: Debouncer,
    cycle: PeriodCycle<{ config::MAX_PERIODS }>,
    pressed: Level,
}

impl Button {
    pub fn new(
        active_low: bool,
        samples: u8,
        cycle: PeriodCycle<{ config::MAX_PERIODS }>,
    ) -> Self {
        let pressed = Level::from(!active_low);
        Self {
            debouncer: Debouncer::new(pressed.toggled(), samples),
            cycle,
            pressed,
        }
    }

    /// Feed one sample; returns the next period on a press
    pub fn on_sample(&mut self, raw: Level) -> Option<u32> {
        match self.debouncer.sample(raw) {
            Some(level) if level == self.pressed => Some(self.cycle.advance()),
            _ => None,
        }
    }
}

struct State {
    pin: Pin,
    button: Button,
}

static STATE: Mutex<RefCell<Option<State>>> = Mutex::new(RefCell::new(None));

/// Presses accepted since start-up
static PRESSES: AtomicU32 = AtomicU32::new(0);

/// Configure the button pin and start sampling it
///
/// Call once, after [`platform::init`] and [`led::init`].
pub fn init() -> HalResult<()> {
    let cycle = PeriodCycle::new(config::BLINK_PERIODS_MS).ok_or(HalError::InvalidParameter)?;
    let button = Button::new(config::BUTTON_ACTIVE_LOW, config::DEBOUNCE_SAMPLES, cycle);

    let pin = platform::with_gpio(|gpio| {
        gpio.init(&GpioParams::input(
            config::BUTTON_PORT,
            config::BUTTON_PIN,
            config::BUTTON_PULL,
        ))
    })?;
    let timer = platform::with_timer(|timer| timer.init(&TimerParams::periodic()))?;

    critical_section::with(|cs| STATE.borrow(cs).replace(Some(State { pin, button })));
    platform::with_timer(|timers| timers.start(timer, config::SAMPLE_PERIOD_MS, on_sample))?;

    #[cfg(feature = "defmt")]
    defmt::info!("button sampled every {=u32} ms", config::SAMPLE_PERIOD_MS);

    Ok(())
}

/// Sampling timer callback (interrupt context)
fn on_sample() {
    let Some(pin) = critical_section::with(|cs| STATE.borrow_ref(cs).as_ref().map(|s| s.pin))
    else {
        return;
    };
    let Ok(raw) = platform::with_gpio(|gpio| Ok(gpio.get(pin))) else {
        return;
    };

    let next = critical_section::with(|cs| {
        STATE
            .borrow_ref_mut(cs)
            .as_mut()
            .and_then(|state| state.button.on_sample(raw))
    });

    if let Some(period_ms) = next {
        let _presses = PRESSES.fetch_add(1, Ordering::Relaxed) + 1;
        #[cfg(feature = "defmt")]
        defmt::info!("press #{=u32}: blinking every {=u32} ms", _presses, period_ms);

        if let Err(_e) = led::set_blinking_period(period_ms) {
            #[cfg(feature = "defmt")]
            defmt::warn!("period change rejected: {}", _e);
        }
    }
}
