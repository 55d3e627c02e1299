//! LED application
//!
//! Toggles the board LED every time its periodic timer expires. The blink
//! period can be changed at any time with [`set_blinking_period`].

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use minihal::{GpioDriver, GpioParams, HalError, HalResult, Level, TimerDriver, TimerParams};

use crate::config;
use crate::platform::{self, Pin, TimerHandle};

/// Blink state of one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blinker {
    active_low: bool,
    lit: bool,
    period_ms: u32,
}

impl Blinker {
    /// Start dark with the given period
    pub const fn new(active_low: bool, period_ms: u32) -> Self {
        Self {
            active_low,
            lit: false,
            period_ms,
        }
    }

    /// Pin level for the current state, honoring polarity
    pub fn level(&self) -> Level {
        Level::from(self.lit != self.active_low)
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn set_period(&mut self, period_ms: u32) {
        self.period_ms = period_ms;
    }

    /// Advance one half-period and return the level to drive
    pub fn on_expiry(&mut self) -> Level {
        self.lit = !self.lit;
        self.level()
    }
}

#[derive(Clone, Copy)]
struct Wiring {
    pin: Pin,
    timer: TimerHandle,
}

static BLINKER: Mutex<RefCell<Blinker>> = Mutex::new(RefCell::new(Blinker::new(
    config::LED_ACTIVE_LOW,
    config::BLINK_PERIODS_MS[0],
)));

static WIRING: Mutex<Cell<Option<Wiring>>> = Mutex::new(Cell::new(None));

/// Configure the LED pin, switch it off and start blinking
///
/// Call once, after [`platform::init`].
pub fn init() -> HalResult<()> {
    let (off, period_ms) = critical_section::with(|cs| {
        let blinker = BLINKER.borrow_ref(cs);
        (blinker.level(), blinker.period_ms())
    });

    let pin = platform::with_gpio(|gpio| {
        let pin = gpio.init(&GpioParams::output(config::LED_PORT, config::LED_PIN))?;
        gpio.set(pin, off)?;
        Ok(pin)
    })?;
    let timer = platform::with_timer(|timer| timer.init(&TimerParams::periodic()))?;

    critical_section::with(|cs| WIRING.borrow(cs).set(Some(Wiring { pin, timer })));
    platform::with_timer(|timers| timers.start(timer, period_ms, on_timer))?;

    #[cfg(feature = "defmt")]
    defmt::info!("LED blinking every {=u32} ms", period_ms);

    Ok(())
}

/// Restart blinking with a new period
///
/// Fails with [`HalError::InvalidParameter`] before [`init`], or with the
/// timer's error if the period is out of range (the old period keeps
/// running in that case).
pub fn set_blinking_period(period_ms: u32) -> HalResult<()> {
    let wiring = critical_section::with(|cs| WIRING.borrow(cs).get())
        .ok_or(HalError::InvalidParameter)?;

    platform::with_timer(|timers| timers.start(wiring.timer, period_ms, on_timer))?;
    critical_section::with(|cs| BLINKER.borrow_ref_mut(cs).set_period(period_ms));

    #[cfg(feature = "defmt")]
    defmt::debug!("LED period now {=u32} ms", period_ms);

    Ok(())
}

/// Timer callback (interrupt context)
fn on_timer() {
    let Some(wiring) = critical_section::with(|cs| WIRING.borrow(cs).get()) else {
        return;
    };
    let level = critical_section::with(|cs| BLINKER.borrow_ref_mut(cs).on_expiry());

    if let Err(_e) = platform::with_gpio(|gpio| gpio.set(wiring.pin, level)) {
        #[cfg(feature = "defmt")]
        defmt::warn!("LED write failed: {}", _e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_low_led_starts_dark_with_high_pin() {
        let blinker = Blinker::new(true, 500);
        assert!(!blinker.is_lit());
        assert_eq!(blinker.level(), Level::High);
    }

    #[test]
    fn test_active_high_led_starts_dark_with_low_pin() {
        let blinker = Blinker::new(false, 500);
        assert_eq!(blinker.level(), Level::Low);
    }

    #[test]
    fn test_expiry_toggles_respecting_polarity() {
        let mut active_low = Blinker::new(true, 100);
        let mut active_high = Blinker::new(false, 100);

        assert_eq!(active_low.on_expiry(), Level::Low);
        assert_eq!(active_high.on_expiry(), Level::High);
        assert!(active_low.is_lit());

        assert_eq!(active_low.on_expiry(), Level::High);
        assert_eq!(active_high.on_expiry(), Level::Low);
        assert!(!active_low.is_lit());
    }

    #[test]
    fn test_period_change_keeps_phase() {
        let mut blinker = Blinker::new(false, 500);
        blinker.on_expiry();

        blinker.set_period(250);

        assert_eq!(blinker.period_ms(), 250);
        assert!(blinker.is_lit());
    }

    #[test]
    fn test_configured_period_list_is_usable() {
        assert!(!config::BLINK_PERIODS_MS.is_empty());
        assert!(config::BLINK_PERIODS_MS.len() <= config::MAX_PERIODS);
        assert!(config::BLINK_PERIODS_MS.iter().all(|&ms| ms > 0));
    }
}
