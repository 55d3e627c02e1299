//! GPIO driver for KL25Z
//!
//! A pin is set up in two blocks: the GPIO block holds its direction and
//! data bits, the PORT block its mux, pull and drive settings. The driver
//! keeps a fixed pool of configured pins.

use minihal::{contract_check, GpioDriver, GpioParams, Handle, HalResult, HandlePool, Level};

use crate::port::{GpioBase, Port, MAX_PIN, PORT_COUNT};
use crate::sdk::{GpioPinConfig, PortPinConfig, PortSdk};

/// Pins the driver can hand out unless configured otherwise
pub const DEFAULT_PIN_CAPACITY: usize = 4;

/// Driver-side record of a configured pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEntry {
    gpio: GpioBase,
    pin: u8,
}

/// Opaque handle to a configured pin
pub type PinHandle = Handle<PinEntry>;

/// KL25Z GPIO driver with room for `N` pins
pub struct Kl25Gpio<S, const N: usize = DEFAULT_PIN_CAPACITY> {
    sdk: S,
    pins: HandlePool<PinEntry, N>,
}

impl<S: PortSdk, const N: usize> Kl25Gpio<S, N> {
    /// Create a driver with an empty pool
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

    /// Forget every configured pin
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&mut self) {
        self.pins.reset();
    }

    fn entry(&self, pin: PinHandle) -> Option<&PinEntry> {
        let entry = self.pins.get(pin);
        contract_check!(entry.is_some());
        entry
    }
}

impl<S: PortSdk, const N: usize> GpioDriver for Kl25Gpio<S, N> {
    type Pin = PinHandle;

    fn init(&mut self, params: &GpioParams) -> HalResult<PinHandle> {
        params.validate(PORT_COUNT, MAX_PIN)?;
        let port = Port::try_from(params.port)?;
        if let Err(e) = self.pins.ensure_free() {
            #[cfg(feature = "defmt")]
            defmt::warn!("GPIO pool full ({=usize} pins)", N);
            return Err(e);
        }

        let gpio = port.gpio_base();

        self.sdk.enable_clock(port);
        self.sdk.gpio_pin_init(
            gpio,
            params.pin,
            &GpioPinConfig {
                direction: params.direction,
                output_logic: Level::Low,
            },
        );
        self.sdk.port_set_pin_config(
            port.port_base(),
            params.pin,
            &PortPinConfig::gpio(params.effective_pull()),
        );

        #[cfg(feature = "defmt")]
        defmt::debug!("PT{=u8}{=u8} configured as {}", params.port, params.pin, params.direction);

        self.pins.claim(PinEntry {
            gpio,
            pin: params.pin,
        })
    }

    fn get(&self, pin: PinHandle) -> Level {
        match self.entry(pin) {
            Some(entry) => Level::from(self.sdk.gpio_read_pin(entry.gpio, entry.pin)),
            None => Level::Low,
        }
    }

    fn set(&mut self, pin: PinHandle, level: Level) -> HalResult<()> {
        let entry = *self.entry(pin).ok_or(minihal::HalError::InvalidParameter)?;
        self.sdk.gpio_write_pin(entry.gpio, entry.pin, level.is_high());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{Call, MockSdk};
    use crate::port::{PortBase, PTA, PTB, PTC, PTD, PTE};
    use minihal::contract::violations;
    use minihal::{Direction, HalError, Pull};
    use proptest::prelude::*;

    fn valid_input() -> GpioParams {
        GpioParams::input(PTA, 0, Pull::None)
    }

    #[test]
    fn test_init_configures_clock_gpio_and_port() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let params = GpioParams::input(PTB, 3, Pull::Up);

        gpio.init(&params).unwrap();

        assert_eq!(
            gpio.sdk.calls.as_slice(),
            &[
                Call::PortClock(Port::B),
                Call::GpioPinInit(
                    GpioBase(0x400F_F040),
                    3,
                    GpioPinConfig {
                        direction: Direction::Input,
                        output_logic: Level::Low,
                    }
                ),
                Call::PortPinConfig(PortBase(0x4004_A000), 3, PortPinConfig::gpio(Pull::Up)),
            ]
        );
    }

    #[test]
    fn test_output_pin_gets_no_pull() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let mut params = GpioParams::output(PTD, 1);
        params.pull = Pull::Down;

        gpio.init(&params).unwrap();

        assert!(gpio
            .sdk
            .calls
            .contains(&Call::PortPinConfig(PortBase(0x4004_C000), 1, PortPinConfig::gpio(Pull::None))));
    }

    #[test]
    fn test_four_pins_then_pool_exhausted() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());

        let a = gpio.init(&GpioParams::output(PTA, 1)).unwrap();
        let b = gpio.init(&GpioParams::output(PTB, 18)).unwrap();
        let c = gpio.init(&GpioParams::input(PTC, 5, Pull::Up)).unwrap();
        let d = gpio.init(&GpioParams::input(PTE, 31, Pull::Down)).unwrap();

        let handles = [a, b, c, d];
        for (i, x) in handles.iter().enumerate() {
            for y in &handles[i + 1..] {
                assert_ne!(x, y);
            }
        }

        let calls_before = gpio.sdk.calls.len();
        assert_eq!(
            gpio.init(&GpioParams::output(PTD, 2)),
            Err(HalError::PoolExhausted)
        );
        assert_eq!(gpio.sdk.calls.len(), calls_before);
        assert_eq!(gpio.allocated(), 4);
    }

    #[test]
    fn test_reset_allows_allocation_again() {
        let mut gpio: Kl25Gpio<MockSdk, 1> = Kl25Gpio::new(MockSdk::new());
        gpio.init(&valid_input()).unwrap();
        assert!(gpio.init(&valid_input()).is_err());

        gpio.reset();
        assert!(gpio.init(&valid_input()).is_ok());
    }

    #[test]
    fn test_port_above_limit_fails() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let params = GpioParams::input(PTE + 1, 0, Pull::None);

        assert_eq!(gpio.init(&params), Err(HalError::InvalidParameter));
        assert!(gpio.sdk.calls.is_empty());
    }

    #[test]
    fn test_pin_above_limit_fails() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let params = GpioParams::input(PTA, 32, Pull::None);

        assert_eq!(gpio.init(&params), Err(HalError::InvalidParameter));
        assert!(gpio.sdk.calls.is_empty());
        assert_eq!(gpio.allocated(), 0);
    }

    #[test]
    fn test_set_then_get_loops_back() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let pin = gpio.init(&GpioParams::output(PTB, 18)).unwrap();

        gpio.set(pin, Level::High).unwrap();
        assert_eq!(gpio.get(pin), Level::High);
        assert_eq!(
            gpio.sdk.calls.last(),
            Some(&Call::GpioWrite(GpioBase(0x400F_F040), 18, true))
        );

        gpio.set(pin, Level::Low).unwrap();
        assert_eq!(gpio.get(pin), Level::Low);
    }

    #[test]
    fn test_get_reads_the_handles_own_pin() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let a = gpio.init(&GpioParams::input(PTC, 9, Pull::None)).unwrap();
        let b = gpio.init(&GpioParams::input(PTC, 10, Pull::None)).unwrap();

        gpio.sdk.lines[PTC as usize] = 1 << 10;

        assert_eq!(gpio.get(a), Level::Low);
        assert_eq!(gpio.get(b), Level::High);
    }

    #[test]
    fn test_unresolved_handle_reads_low_without_hardware_access() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let pin = gpio.init(&GpioParams::input(PTA, 4, Pull::None)).unwrap();
        gpio.sdk.lines[PTA as usize] = 1 << 4;
        gpio.reset();

        let before = violations();
        assert_eq!(gpio.get(pin), Level::Low);
        assert_eq!(gpio.sdk.reads.get(), 0);
        assert!(violations() > before);
    }

    #[test]
    fn test_unresolved_handle_write_is_rejected() {
        let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
        let pin = gpio.init(&GpioParams::output(PTA, 4)).unwrap();
        gpio.reset();
        let calls_before = gpio.sdk.calls.len();

        assert_eq!(gpio.set(pin, Level::High), Err(HalError::InvalidParameter));
        assert_eq!(gpio.sdk.calls.len(), calls_before);
    }

    proptest! {
        #[test]
        fn prop_out_of_range_params_touch_nothing(
            port in 0u8..=255,
            pin in 0u8..=255,
            output in any::<bool>(),
        ) {
            prop_assume!(port >= PORT_COUNT || pin > MAX_PIN);
            let mut gpio: Kl25Gpio<MockSdk> = Kl25Gpio::new(MockSdk::new());
            let params = if output {
                GpioParams::output(port, pin)
            } else {
                GpioParams::input(port, pin, Pull::Up)
            };

            prop_assert_eq!(gpio.init(&params), Err(HalError::InvalidParameter));
            prop_assert!(gpio.sdk.calls.is_empty());
            prop_assert_eq!(gpio.allocated(), 0);
        }
    }
}
