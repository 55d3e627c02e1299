//! FRDM-KL25Z clock bring-up
//!
//! The core keeps running from the default FLL clock. The 8 MHz crystal
//! oscillator is started and its OSCERCLK output routed to the TPMs.

use crate::mmio::{modify32, read8, write32, write8};
use crate::registers::sim;

/// Crystal frequency on the FRDM-KL25Z
pub const OSCERCLK_HZ: u32 = 8_000_000;

const MCG_C2: usize = 0x4006_4001;
const MCG_S: usize = 0x4006_4006;
const OSC0_CR: usize = 0x4006_5000;

/// Frequency range select: high range (3-32 MHz crystal)
const C2_RANGE0_HIGH: u8 = 0b01 << 4;
/// Oscillator requested (crystal rather than external clock)
const C2_EREFS0: u8 = 1 << 2;
const S_OSCINIT0: u8 = 1 << 1;
const CR_ERCLKEN: u8 = 1 << 7;

/// Clock frequencies established by [`init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Clocks {
    /// Clock feeding the TPM prescalers
    pub tpm_hz: u32,
}

/// Bring up the board clocks
///
/// Disables the COP watchdog, starts the crystal oscillator and selects it
/// as the TPM clock source. Call once, first thing after reset.
pub fn init() -> Clocks {
    // SAFETY: single-threaded start-up code writing documented SIM/MCG/OSC
    // registers; COPC is write-once after reset.
    unsafe {
        write32(sim::COPC, 0);

        write8(OSC0_CR, CR_ERCLKEN);
        write8(MCG_C2, C2_RANGE0_HIGH | C2_EREFS0);
        while read8(MCG_S) & S_OSCINIT0 == 0 {}

        modify32(sim::SOPT2, |v| {
            (v & !sim::SOPT2_TPMSRC_MASK) | sim::TPMSRC_OSCERCLK << sim::SOPT2_TPMSRC_SHIFT
        });
    }

    #[cfg(feature = "defmt")]
    defmt::info!("KL25Z clocks up, OSCERCLK {=u32} Hz to TPM", OSCERCLK_HZ);

    Clocks {
        tpm_hz: OSCERCLK_HZ,
    }
}
