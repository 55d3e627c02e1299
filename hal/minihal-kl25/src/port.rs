//! KL25Z ports and their peripheral base addresses
//!
//! Each port has a PORT block (pin mux, pull, drive) and a GPIO block
//! (data registers), both addressed from the port index.

use minihal::HalError;

/// Port count on the 80-pin KL25Z
pub const PORT_COUNT: u8 = 5;

/// Highest pin index on a port
pub const MAX_PIN: u8 = 31;

/// GPIO (PTx) block base addresses, indexed by port
pub const GPIO_BASES: [usize; PORT_COUNT as usize] = [
    0x400F_F000, // PTA
    0x400F_F040, // PTB
    0x400F_F080, // PTC
    0x400F_F0C0, // PTD
    0x400F_F100, // PTE
];

/// PORT (pin control) block base addresses, indexed by port
pub const PORT_BASES: [usize; PORT_COUNT as usize] = [
    0x4004_9000, // PORTA
    0x4004_A000, // PORTB
    0x4004_B000, // PORTC
    0x4004_C000, // PORTD
    0x4004_D000, // PORTE
];

/// Port index constants for [`GpioParams`](minihal::GpioParams)
pub const PTA: u8 = Port::A as u8;
pub const PTB: u8 = Port::B as u8;
pub const PTC: u8 = Port::C as u8;
pub const PTD: u8 = Port::D as u8;
pub const PTE: u8 = Port::E as u8;

/// Base address of a GPIO data block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioBase(pub usize);

/// Base address of a PORT pin control block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortBase(pub usize);

/// KL25Z port
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
    /// GPIO data block of this port
    pub fn gpio_base(self) -> GpioBase {
        GpioBase(GPIO_BASES[self as usize])
    }

    /// PORT pin control block of this port
    pub fn port_base(self) -> PortBase {
        PortBase(PORT_BASES[self as usize])
    }

    /// Clock gate bit in SIM_SCGC5
    pub fn clock_gate_bit(self) -> u32 {
        9 + self as u32
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
