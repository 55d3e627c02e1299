//! GPIO pin abstractions
//!
//! Provides the parameters, validation and driver trait for digital input
//! and output pins, implemented by the chip-specific HALs.

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin, PinState};

use crate::error::{HalError, HalResult};

/// Logic level on a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if this is the high level
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// The opposite level
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => PinState::Low,
            Level::High => PinState::High,
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Direction {
    /// Digital input
    Input = 0,
    /// Digital push-pull output
    Output = 1,
}

impl TryFrom<u8> for Direction {
    type Error = HalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Input),
            1 => Ok(Direction::Output),
            _ => Err(HalError::InvalidParameter),
        }
    }
}

/// Internal pull resistor setting, meaningful for inputs only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pull {
    /// No pull resistor
    #[default]
    None = 0,
    /// Pull-up resistor
    Up = 1,
    /// Pull-down resistor
    Down = 2,
}

impl TryFrom<u8> for Pull {
    type Error = HalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Pull::None),
            1 => Ok(Pull::Up),
            2 => Ok(Pull::Down),
            _ => Err(HalError::InvalidParameter),
        }
    }
}

/// Everything needed to initialize a pin
///
/// `port` and `pin` are raw indices (port A = 0) because their valid range
/// depends on the target. Each HAL exports named constants for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioParams {
    pub port: u8,
    pub pin: u8,
    pub direction: Direction,
    pub pull: Pull,
}

impl GpioParams {
    /// Parameters for an output pin
    pub const fn output(port: u8, pin: u8) -> Self {
        Self {
            port,
            pin,
            direction: Direction::Output,
            pull: Pull::None,
        }
    }

    /// Parameters for an input pin
    pub const fn input(port: u8, pin: u8, pull: Pull) -> Self {
        Self {
            port,
            pin,
            direction: Direction::Input,
            pull,
        }
    }

    /// Check port and pin against the target's ranges
    ///
    /// `port_count` is the number of ports, `max_pin` the highest pin index
    /// on a port.
    pub fn validate(&self, port_count: u8, max_pin: u8) -> HalResult<()> {
        if self.port >= port_count || self.pin > max_pin {
            return Err(HalError::InvalidParameter);
        }
        Ok(())
    }

    /// Pull setting that actually applies: outputs never get a pull
    pub fn effective_pull(&self) -> Pull {
        match self.direction {
            Direction::Input => self.pull,
            Direction::Output => Pull::None,
        }
    }
}

/// GPIO driver implemented by each target
///
/// A driver owns a fixed pool of pins. [`init`](GpioDriver::init) configures
/// the hardware and returns an opaque handle; the pin cannot be released.
pub trait GpioDriver {
    /// Opaque pin handle
    type Pin: Copy;

    /// Configure a pin and claim a handle for it
    ///
    /// Fails without touching the hardware if the parameters are out of
    /// range or the pool is full.
    fn init(&mut self, params: &GpioParams) -> HalResult<Self::Pin>;

    /// Read the input level of a pin
    ///
    /// There is no failure channel: a handle that does not resolve reads as
    /// [`Level::Low`].
    fn get(&self, pin: Self::Pin) -> Level;

    /// Drive an output pin
    fn set(&mut self, pin: Self::Pin, level: Level) -> HalResult<()>;

    /// Invert the level of an output pin
    fn toggle(&mut self, pin: Self::Pin) -> HalResult<()> {
        let level = self.get(pin);
        self.set(pin, level.toggled())
    }

    /// Borrow a pin as an `embedded-hal` digital pin
    fn bind(&mut self, pin: Self::Pin) -> BoundPin<'_, Self>
    where
        Self: Sized,
    {
        BoundPin { driver: self, pin }
    }
}

impl digital::Error for HalError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A pin bound to its driver
///
/// Implements the `embedded-hal` digital traits so that drivers written
/// against `embedded-hal` can use minihal pins.
pub struct BoundPin<'d, D: GpioDriver> {
    driver: &'d mut D,
    pin: D::Pin,
}

impl<D: GpioDriver> BoundPin<'_, D> {
    /// The underlying handle
    pub fn handle(&self) -> D::Pin {
        self.pin
    }
}

impl<D: GpioDriver> ErrorType for BoundPin<'_, D> {
    type Error = HalError;
}

impl<D: GpioDriver> OutputPin for BoundPin<'_, D> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.driver.set(self.pin, Level::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.driver.set(self.pin, Level::High)
    }
}

impl<D: GpioDriver> InputPin for BoundPin<'_, D> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.driver.get(self.pin).is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.driver.get(self.pin).is_high())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use proptest::prelude::*;

    /// Single-port driver whose pins loop outputs back to inputs
    struct LoopbackGpio {
        lines: u32,
        pins: u8,
    }

    impl GpioDriver for LoopbackGpio {
        type Pin = u8;

        fn init(&mut self, params: &GpioParams) -> HalResult<u8> {
            params.validate(1, 31)?;
            self.pins += 1;
            Ok(params.pin)
        }

        fn get(&self, pin: u8) -> Level {
            Level::from(self.lines & (1 << pin) != 0)
        }

        fn set(&mut self, pin: u8, level: Level) -> HalResult<()> {
            match level {
                Level::High => self.lines |= 1 << pin,
                Level::Low => self.lines &= !(1 << pin),
            }
            Ok(())
        }
    }

    #[test]
    fn test_raw_direction_conversion() {
        assert_eq!(Direction::try_from(0), Ok(Direction::Input));
        assert_eq!(Direction::try_from(1), Ok(Direction::Output));
        assert_eq!(Direction::try_from(2), Err(HalError::InvalidParameter));
    }

    #[test]
    fn test_raw_pull_conversion() {
        assert_eq!(Pull::try_from(0), Ok(Pull::None));
        assert_eq!(Pull::try_from(1), Ok(Pull::Up));
        assert_eq!(Pull::try_from(2), Ok(Pull::Down));
        assert_eq!(Pull::try_from(3), Err(HalError::InvalidParameter));
    }

    #[test]
    fn test_outputs_never_get_a_pull() {
        let mut params = GpioParams::output(1, 4);
        params.pull = Pull::Up;
        assert_eq!(params.effective_pull(), Pull::None);

        let params = GpioParams::input(1, 4, Pull::Down);
        assert_eq!(params.effective_pull(), Pull::Down);
    }

    #[test]
    fn test_validate_bounds_are_inclusive_for_pin() {
        assert!(GpioParams::output(4, 15).validate(5, 15).is_ok());
        assert!(GpioParams::output(5, 0).validate(5, 15).is_err());
        assert!(GpioParams::output(0, 16).validate(5, 15).is_err());
    }

    #[test]
    fn test_toggle_inverts_level() {
        let mut gpio = LoopbackGpio { lines: 0, pins: 0 };
        let pin = gpio.init(&GpioParams::output(0, 3)).unwrap();

        gpio.toggle(pin).unwrap();
        assert_eq!(gpio.get(pin), Level::High);
        gpio.toggle(pin).unwrap();
        assert_eq!(gpio.get(pin), Level::Low);
    }

    #[test]
    fn test_bound_pin_drives_embedded_hal() {
        let mut gpio = LoopbackGpio { lines: 0, pins: 0 };
        let pin = gpio.init(&GpioParams::output(0, 7)).unwrap();

        let mut bound = gpio.bind(pin);
        bound.set_high().unwrap();
        assert!(bound.is_high().unwrap());
        bound.set_state(PinState::Low).unwrap();
        assert!(bound.is_low().unwrap());
        assert_eq!(gpio.pins, 1);
    }

    proptest! {
        #[test]
        fn prop_validate_accepts_exactly_the_range(port in 0u8..=255, pin in 0u8..=255) {
            let result = GpioParams::input(port, pin, Pull::None).validate(5, 31);
            prop_assert_eq!(result.is_ok(), port < 5 && pin <= 31);
        }
    }
}
