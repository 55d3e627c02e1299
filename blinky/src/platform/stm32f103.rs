//! STM32F103

use minihal_stm32f1::board;
use minihal_stm32f1::{Stm32Gpio, Stm32Registers, Stm32Timer};

pub use minihal_stm32f1::{PinHandle as Pin, TimerHandle};

pub const NAME: &str = "STM32F103";

pub type Gpio = Stm32Gpio<Stm32Registers>;
pub type Timer = Stm32Timer<Stm32Registers>;

pub(super) fn drivers() -> (Gpio, Timer) {
    let clocks = board::init();
    (
        Stm32Gpio::new(Stm32Registers::new(clocks.timer_hz)),
        Stm32Timer::new(Stm32Registers::new(clocks.timer_hz)),
    )
}

/// Timer interrupts
///
/// The vector table and `device.x` come from the PAC (`rt` feature), which
/// is only enabled for bare-metal builds.
#[cfg(target_os = "none")]
mod irq {
    use minihal_stm32f1::pac::interrupt;
    use minihal_stm32f1::sdk::Tim;

    /// Acknowledge `tim` under the lock, then run its callback without it
    fn dispatch(tim: Tim) {
        let callback = critical_section::with(|cs| {
            crate::platform::TIMER
                .borrow_ref_mut(cs)
                .as_mut()
                .and_then(|timer| timer.take_expired(tim))
        });
        if let Some(callback) = callback {
            callback();
        }
    }

    #[interrupt]
    fn TIM3() {
        dispatch(Tim::Tim3);
    }

    #[interrupt]
    fn TIM4() {
        dispatch(Tim::Tim4);
    }
}
