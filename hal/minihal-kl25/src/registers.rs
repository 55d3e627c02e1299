//! Register-level backend for the KL25Z SDK traits
//!
//! Implements [`PortSdk`] and [`TpmSdk`] with volatile accesses to the SIM,
//! PORT, GPIO and TPM blocks, and unmasks TPM interrupts in the NVIC.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;
use minihal::Direction;

use crate::mmio::{modify32, read32, write32};
use crate::port::{GpioBase, Port, PortBase};
use crate::sdk::{GpioPinConfig, PortPinConfig, PortSdk, Tpm, TpmConfig, TpmSdk};

/// System Integration Module registers
pub(crate) mod sim {
    pub const SOPT2: usize = 0x4004_8004;
    pub const SCGC5: usize = 0x4004_8038;
    pub const SCGC6: usize = 0x4004_803C;
    pub const COPC: usize = 0x4004_8100;

    /// TPM clock source select, bits 25:24
    pub const SOPT2_TPMSRC_SHIFT: u32 = 24;
    pub const SOPT2_TPMSRC_MASK: u32 = 0b11 << SOPT2_TPMSRC_SHIFT;
    /// OSCERCLK as TPM clock
    pub const TPMSRC_OSCERCLK: u32 = 2;
}

// GPIO register offsets
const PSOR: usize = 0x04;
const PCOR: usize = 0x08;
const PDIR: usize = 0x10;
const PDDR: usize = 0x14;

// TPM register offsets and SC fields
const TPM_SC: usize = 0x00;
const TPM_CNT: usize = 0x04;
const TPM_MOD: usize = 0x08;
const TPM_CONF: usize = 0x84;
const SC_PS_MASK: u32 = 0b111;
const SC_CMOD_SHIFT: u32 = 3;
const SC_CMOD_MASK: u32 = 0b11 << SC_CMOD_SHIFT;
const SC_TOIE: u32 = 1 << 6;
const SC_TOF: u32 = 1 << 7;
const CONF_DBGMODE: u32 = 0b11 << 6;

/// Implemented priority bits of the Cortex-M0+ NVIC on this part
const NVIC_PRIO_BITS: u8 = 2;

/// NVIC line of a TPM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TpmIrq(Tpm);

// SAFETY: TPM interrupt numbers 17..=19 are valid lines on this device.
unsafe impl InterruptNumber for TpmIrq {
    fn number(self) -> u16 {
        self.0.irq()
    }
}

/// Volatile register backend
///
/// `tpm_clock_hz` is the frequency the board routed to the TPMs, as
/// reported by [`board::init`](crate::board::init).
#[derive(Debug)]
pub struct Kl25Registers {
    tpm_clock_hz: u32,
}

impl Kl25Registers {
    /// Create the backend
    ///
    /// Holds no register state, so the GPIO and timer drivers may each own
    /// one. The clock tree must already be set up as `tpm_clock_hz` says.
    pub const fn new(tpm_clock_hz: u32) -> Self {
        Self { tpm_clock_hz }
    }
}

impl PortSdk for Kl25Registers {
    fn enable_clock(&mut self, port: Port) {
        // SAFETY: SCGC5 is a valid SIM register; only the port's gate bit changes.
        unsafe { modify32(sim::SCGC5, |v| v | 1 << port.clock_gate_bit()) }
    }

    fn gpio_pin_init(&mut self, gpio: GpioBase, pin: u8, config: &GpioPinConfig) {
        let mask = 1u32 << pin;
        // SAFETY: `gpio` is one of the GPIO block bases and `pin` <= 31.
        unsafe {
            match config.direction {
                Direction::Input => modify32(gpio.0 + PDDR, |v| v & !mask),
                Direction::Output => {
                    let latch = if config.output_logic.is_high() { PSOR } else { PCOR };
                    write32(gpio.0 + latch, mask);
                    modify32(gpio.0 + PDDR, |v| v | mask);
                }
            }
        }
    }

    fn port_set_pin_config(&mut self, port: PortBase, pin: u8, config: &PortPinConfig) {
        // SAFETY: PCRn lives at 4 * n inside the PORT block, n <= 31.
        unsafe { write32(port.0 + 4 * pin as usize, config.pcr_bits()) }
    }

    fn gpio_read_pin(&self, gpio: GpioBase, pin: u8) -> bool {
        // SAFETY: PDIR is read-only input data of a valid GPIO block.
        unsafe { read32(gpio.0 + PDIR) & (1 << pin) != 0 }
    }

    fn gpio_write_pin(&mut self, gpio: GpioBase, pin: u8, high: bool) {
        let latch = if high { PSOR } else { PCOR };
        // SAFETY: set/clear registers only affect the bits written as 1.
        unsafe { write32(gpio.0 + latch, 1 << pin) }
    }
}

impl TpmSdk for Kl25Registers {
    fn clock_freq(&self) -> u32 {
        self.tpm_clock_hz
    }

    fn enable_clock(&mut self, tpm: Tpm) {
        // SAFETY: valid SIM registers; only the TPM source field and the
        // instance gate bit change.
        unsafe {
            modify32(sim::SOPT2, |v| {
                (v & !sim::SOPT2_TPMSRC_MASK) | sim::TPMSRC_OSCERCLK << sim::SOPT2_TPMSRC_SHIFT
            });
            modify32(sim::SCGC6, |v| v | 1 << tpm.clock_gate_bit());
        }
    }

    fn init(&mut self, tpm: Tpm, config: &TpmConfig) {
        let base = tpm.base();
        // SAFETY: the TPM clock is gated on, so its registers are accessible.
        unsafe {
            // Counter must be disabled before PS can change
            write32(base + TPM_SC, 0);
            while read32(base + TPM_SC) & SC_CMOD_MASK != 0 {}
            write32(base + TPM_CNT, 0);
            write32(base + TPM_SC, SC_TOF | config.prescale as u32 & SC_PS_MASK);
            write32(
                base + TPM_CONF,
                if config.run_in_debug { CONF_DBGMODE } else { 0 },
            );
        }
    }

    fn enable_overflow_interrupt(&mut self, tpm: Tpm) {
        // SAFETY: SC of a clocked TPM; TOF is write-1-to-clear so it is masked out.
        unsafe { modify32(tpm.base() + TPM_SC, |v| (v & !SC_TOF) | SC_TOIE) }
    }

    fn enable_irq(&mut self, tpm: Tpm, priority: u8) {
        let irq = TpmIrq(tpm);
        // SAFETY: called during init before the line is live; the priority
        // write touches only this line's byte.
        unsafe {
            let mut core = cortex_m::Peripherals::steal();
            core.NVIC.set_priority(irq, priority << (8 - NVIC_PRIO_BITS));
            NVIC::unpend(irq);
            NVIC::unmask(irq);
        }
    }

    fn stop(&mut self, tpm: Tpm) {
        let sc = tpm.base() + TPM_SC;
        // SAFETY: SC of a clocked TPM; the loop waits for the CMOD acknowledge.
        unsafe {
            modify32(sc, |v| v & !(SC_CMOD_MASK | SC_TOF));
            while read32(sc) & SC_CMOD_MASK != 0 {}
        }
    }

    fn clear_counter(&mut self, tpm: Tpm) {
        // SAFETY: any write to CNT clears it.
        unsafe { write32(tpm.base() + TPM_CNT, 0) }
    }

    fn set_period(&mut self, tpm: Tpm, modulo: u16) {
        // SAFETY: MOD of a stopped TPM takes effect immediately.
        unsafe { write32(tpm.base() + TPM_MOD, modulo as u32) }
    }

    fn start(&mut self, tpm: Tpm) {
        // SAFETY: SC of a clocked TPM; CMOD=01 counts on the module clock.
        unsafe {
            modify32(tpm.base() + TPM_SC, |v| {
                (v & !(SC_CMOD_MASK | SC_TOF)) | 1 << SC_CMOD_SHIFT
            })
        }
    }

    fn clear_overflow_flag(&mut self, tpm: Tpm) {
        // SAFETY: writing TOF back as 1 acknowledges the overflow.
        unsafe { modify32(tpm.base() + TPM_SC, |v| v | SC_TOF) }
    }
}
