//! FRDM-KL25Z

use minihal_kl25::board;
use minihal_kl25::sdk::Tpm;
use minihal_kl25::{Kl25Gpio, Kl25Registers, Kl25Timer};

pub use minihal_kl25::{PinHandle as Pin, TimerHandle};

pub const NAME: &str = "FRDM-KL25Z";

pub type Gpio = Kl25Gpio<Kl25Registers>;
pub type Timer = Kl25Timer<Kl25Registers>;

pub(super) fn drivers() -> (Gpio, Timer) {
    let clocks = board::init();
    (
        Kl25Gpio::new(Kl25Registers::new(clocks.tpm_hz)),
        Kl25Timer::new(Kl25Registers::new(clocks.tpm_hz)),
    )
}

/// Acknowledge `tpm` under the lock, then run its callback without it
fn dispatch(tpm: Tpm) {
    let callback = critical_section::with(|cs| {
        super::TIMER
            .borrow_ref_mut(cs)
            .as_mut()
            .and_then(|timer| timer.take_expired(tpm))
    });
    if let Some(callback) = callback {
        callback();
    }
}

#[no_mangle]
extern "C" fn TPM0() {
    dispatch(Tpm::Tpm0);
}

#[no_mangle]
extern "C" fn TPM1() {
    dispatch(Tpm::Tpm1);
}

#[no_mangle]
extern "C" fn TPM2() {
    dispatch(Tpm::Tpm2);
}

/// Flash configuration field: no backdoor key, no protection, unsecured
#[cfg(not(test))]
#[link_section = ".flash_config"]
#[used]
static FLASH_CONFIG: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // backdoor key
    0xFF, 0xFF, 0xFF, 0xFF, // FPROT
    0xFE, // FSEC
    0xFF, // FOPT
    0xFF, // FEPROT
    0xFF, // FDPROT
];

#[cfg(not(test))]
mod vectors {
    #[derive(Clone, Copy)]
    pub union Vector {
        handler: unsafe extern "C" fn(),
        reserved: usize,
    }

    extern "C" {
        fn DefaultHandler();
    }

    const RESERVED: Vector = Vector { reserved: 0 };
    const DEFAULT: Vector = Vector {
        handler: DefaultHandler,
    };

    /// KL25Z interrupt vectors, IRQ 0..31
    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    pub static __INTERRUPTS: [Vector; 32] = {
        let mut vectors = [DEFAULT; 32];
        vectors[17] = Vector { handler: super::TPM0 };
        vectors[18] = Vector { handler: super::TPM1 };
        vectors[19] = Vector { handler: super::TPM2 };
        vectors[4] = RESERVED;
        vectors[23] = RESERVED;
        vectors[29] = RESERVED;
        vectors
    };
}
