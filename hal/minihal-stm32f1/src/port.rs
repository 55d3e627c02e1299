//! STM32F103 GPIO ports
//!
//! All ports sit on APB2. Register blocks come from the PAC, see
//! [`registers`](crate::registers).

use minihal::HalError;

/// Ports bonded out on the 100-pin STM32F103
pub const PORT_COUNT: u8 = 5;

/// Highest pin index on a port
pub const MAX_PIN: u8 = 15;

/// Port index constants for [`GpioParams`](minihal::GpioParams)
pub const PA: u8 = Port::A as u8;
pub const PB: u8 = Port::B as u8;
pub const PC: u8 = Port::C as u8;
pub const PD: u8 = Port::D as u8;
pub const PE: u8 = Port::E as u8;

/// STM32F103 port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
}

impl Port {
    /// Position of the port in `[A, B, C, D, E]`
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Port {
    type Error = HalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Port::A),
            1 => Ok(Port::B),
            2 => Ok(Port::C),
            3 => Ok(Port::D),
            4 => Ok(Port::E),
            _ => Err(HalError::InvalidParameter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_indices() {
        assert_eq!(Port::A.index(), 0);
        assert_eq!(Port::E.index(), PORT_COUNT as usize - 1);
    }

    #[test]
    fn test_port_conversion() {
        assert_eq!(Port::try_from(PB), Ok(Port::B));
        assert_eq!(Port::try_from(PE + 1), Err(HalError::InvalidParameter));
    }
}
