//! GPIO driver for STM32F103

use minihal::{
    contract_check, Direction, GpioDriver, GpioParams, HalError, HalResult, Handle, HandlePool,
    Level,
};

use crate::port::{Port, MAX_PIN, PORT_COUNT};
use crate::sdk::{GpioInit, GpioSdk};

/// Pins the driver can hand out unless configured otherwise
pub const DEFAULT_PIN_CAPACITY: usize = 8;

/// Pool entry of a configured pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEntry {
    port: Port,
    pin: u8,
}

/// Opaque handle to a configured pin
pub type PinHandle = Handle<PinEntry>;

/// STM32F103 GPIO driver with room for `N` pins
pub struct Stm32Gpio<S, const N: usize = DEFAULT_PIN_CAPACITY> {
    sdk: S,
    pins: HandlePool<PinEntry, N>,
}

impl<S: GpioSdk, const N: usize> Stm32Gpio<S, N> {
    /// Create a driver with no pins configured
    pub const fn new(sdk: S) -> Self {
        Self {
            sdk,
            pins: HandlePool::new(),
        }
    }

    /// Number of pins configured so far
    pub fn allocated(&self) -> usize {
        self.pins.len()
    }

    /// Forget all pins (host tests only)
    ///
    /// The hardware is left as configured.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&mut self) {
        self.pins.reset();
    }

    /// Pool entry behind a handle; a miss is a contract violation
    fn entry(&self, pin: PinHandle) -> Option<&PinEntry> {
        let entry = self.pins.get(pin);
        contract_check!(entry.is_some());
        entry
    }
}

impl<S: GpioSdk, const N: usize> GpioDriver for Stm32Gpio<S, N> {
    type Pin = PinHandle;

    fn init(&mut self, params: &GpioParams) -> HalResult<PinHandle> {
        params.validate(PORT_COUNT, MAX_PIN)?;
        let port = Port::try_from(params.port)?;
        if let Err(e) = self.pins.ensure_free() {
            #[cfg(feature = "defmt")]
            defmt::warn!("GPIO pool full ({=usize} pins)", N);
            return Err(e);
        }

        self.sdk.enable_clock(port);

        let init = match params.direction {
            Direction::Input => GpioInit::input(params.pull),
            Direction::Output => {
                // Latch Low before the output driver turns on
                self.sdk.write_pin(port, params.pin, false);
                GpioInit::output()
            }
        };
        self.sdk.init(port, params.pin, &init);

        #[cfg(feature = "defmt")]
        defmt::debug!("P{=u8}{=u8} configured as {}", params.port, params.pin, init);

        self.pins.claim(PinEntry {
            port,
            pin: params.pin,
        })
    }

    fn get(&self, pin: PinHandle) -> Level {
        self.entry(pin)
            .map(|entry| Level::from(self.sdk.read_pin(entry.port, entry.pin)))
            .unwrap_or(Level::Low)
    }

    fn set(&mut self, pin: PinHandle, level: Level) -> HalResult<()> {
        let entry = *self.entry(pin).ok_or(HalError::InvalidParameter)?;
        self.sdk.write_pin(entry.port, entry.pin, level.is_high());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{Call, MockSdk};
    use crate::port::{PA, PB, PC, PD, PE};
    use minihal::contract::violations;
    use minihal::Pull;
    use proptest::prelude::*;

    fn driver() -> Stm32Gpio<MockSdk> {
        Stm32Gpio::new(MockSdk::new())
    }

    #[test]
    fn test_input_init_calls_clock_and_pin_init() {
        let mut gpio = driver();

        gpio.init(&GpioParams::input(PA, 0, Pull::None)).unwrap();

        assert_eq!(
            gpio.sdk.calls.as_slice(),
            &[
                Call::GpioClock(Port::A),
                Call::GpioInit(Port::A, 0, GpioInit::input(Pull::None)),
            ]
        );
    }

    #[test]
    fn test_output_is_latched_low_before_init() {
        let mut gpio = driver();
        gpio.sdk.lines[PC as usize] = 0xFFFF;

        gpio.init(&GpioParams::output(PC, 13)).unwrap();

        assert_eq!(
            &gpio.sdk.calls[1..],
            &[
                Call::GpioWrite(Port::C, 13, false),
                Call::GpioInit(Port::C, 13, GpioInit::output()),
            ]
        );
    }

    #[test]
    fn test_eight_pins_then_pool_exhausted() {
        let mut gpio = driver();
        let mut handles = heapless::Vec::<PinHandle, 8>::new();
        for pin in 0..8 {
            let port = [PA, PB, PC, PD, PE][pin as usize % 5];
            handles.push(gpio.init(&GpioParams::output(port, pin)).unwrap()).unwrap();
        }
        for (i, a) in handles.iter().enumerate() {
            assert!(handles[i + 1..].iter().all(|b| a != b));
        }

        let calls_before = gpio.sdk.calls.len();
        assert_eq!(
            gpio.init(&GpioParams::input(PA, 9, Pull::Up)),
            Err(HalError::PoolExhausted)
        );
        assert_eq!(gpio.sdk.calls.len(), calls_before);
    }

    #[test]
    fn test_limits() {
        let mut gpio = driver();

        assert_eq!(
            gpio.init(&GpioParams::input(PE + 1, 0, Pull::None)),
            Err(HalError::InvalidParameter)
        );
        assert_eq!(
            gpio.init(&GpioParams::input(PA, 16, Pull::None)),
            Err(HalError::InvalidParameter)
        );
        assert!(gpio.sdk.calls.is_empty());

        assert!(gpio.init(&GpioParams::input(PE, 15, Pull::Down)).is_ok());
    }

    #[test]
    fn test_set_then_get_loops_back() {
        let mut gpio = driver();
        let pin = gpio.init(&GpioParams::output(PB, 7)).unwrap();

        gpio.set(pin, Level::High).unwrap();
        assert_eq!(gpio.get(pin), Level::High);

        gpio.toggle(pin).unwrap();
        assert_eq!(gpio.get(pin), Level::Low);
    }

    #[test]
    fn test_unresolved_handle() {
        let mut gpio = driver();
        let pin = gpio.init(&GpioParams::output(PB, 7)).unwrap();
        gpio.set(pin, Level::High).unwrap();
        gpio.reset();
        let calls_before = gpio.sdk.calls.len();
        let before = violations();

        assert_eq!(gpio.get(pin), Level::Low);
        assert_eq!(gpio.set(pin, Level::Low), Err(HalError::InvalidParameter));

        assert_eq!(gpio.sdk.reads.get(), 0);
        assert_eq!(gpio.sdk.calls.len(), calls_before);
        assert!(violations() >= before + 2);
    }

    proptest! {
        #[test]
        fn prop_valid_params_always_allocate(port in 0u8..PORT_COUNT, pin in 0u8..=MAX_PIN) {
            let mut gpio = driver();
            let handle = gpio.init(&GpioParams::input(port, pin, Pull::Up));

            prop_assert!(handle.is_ok());
            prop_assert_eq!(gpio.allocated(), 1);
            prop_assert_eq!(
                gpio.sdk.count(|c| matches!(c, Call::GpioInit(_, p, _) if *p == pin)),
                1
            );
        }

        #[test]
        fn prop_invalid_params_never_allocate(port in 0u8..=255, pin in 0u8..=255) {
            prop_assume!(port >= PORT_COUNT || pin > MAX_PIN);
            let mut gpio = driver();

            prop_assert_eq!(
                gpio.init(&GpioParams::output(port, pin)),
                Err(HalError::InvalidParameter)
            );
            prop_assert!(gpio.sdk.calls.is_empty());
        }
    }
}
