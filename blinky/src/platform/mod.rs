//! Target selection and the shared driver instances
//!
//! The drivers live in critical-section mutexes: applications reach them
//! from thread mode during start-up and from the timer callbacks, which run
//! in interrupt context.

use core::cell::RefCell;

use critical_section::Mutex;
use minihal::{HalError, HalResult};

cfg_if::cfg_if! {
    if #[cfg(feature = "kl25")] {
        mod kl25;
        pub use kl25::*;
    } else if #[cfg(feature = "stm32f103")] {
        mod stm32f103;
        pub use stm32f103::*;
    }
}

static GPIO: Mutex<RefCell<Option<Gpio>>> = Mutex::new(RefCell::new(None));
static TIMER: Mutex<RefCell<Option<Timer>>> = Mutex::new(RefCell::new(None));

/// Bring up the board and hand the drivers their register backends
pub fn init() {
    let (gpio, timer) = drivers();
    critical_section::with(|cs| {
        GPIO.borrow(cs).replace(Some(gpio));
        TIMER.borrow(cs).replace(Some(timer));
    });
}

/// Run `f` with exclusive access to the GPIO driver
///
/// Fails with [`HalError::ClockUnavailable`] before [`init`].
pub fn with_gpio<R>(f: impl FnOnce(&mut Gpio) -> HalResult<R>) -> HalResult<R> {
    critical_section::with(|cs| match GPIO.borrow_ref_mut(cs).as_mut() {
        Some(gpio) => f(gpio),
        None => Err(HalError::ClockUnavailable),
    })
}

/// Run `f` with exclusive access to the timer driver
///
/// Fails with [`HalError::ClockUnavailable`] before [`init`].
pub fn with_timer<R>(f: impl FnOnce(&mut Timer) -> HalResult<R>) -> HalResult<R> {
    critical_section::with(|cs| match TIMER.borrow_ref_mut(cs).as_mut() {
        Some(timer) => f(timer),
        None => Err(HalError::ClockUnavailable),
    })
}
