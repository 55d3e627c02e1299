//! Contract checks for internal invariants
//!
//! Drivers validate every caller-supplied parameter and report failures
//! through [`HalError`](crate::HalError). Some conditions can only arise from
//! misuse the public API cannot express (a handle from another pool, an
//! interrupt from a timer nobody allocated). Those go through
//! [`contract_check!`](crate::contract_check).
//!
//! In firmware builds a violation panics, and the panic handler halts the
//! core. With the `test-hooks` feature (or when this crate is under test)
//! violations are counted instead and execution carries on, so tests can
//! observe the fail-open path that follows the check.

#[cfg(any(test, feature = "test-hooks"))]
use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(any(test, feature = "test-hooks"))]
static VIOLATIONS: AtomicU32 = AtomicU32::new(0);

/// Check an internal invariant, halting on violation in firmware builds
///
/// ```ignore
/// contract_check!(timer_found);
/// ```
#[macro_export]
macro_rules! contract_check {
    ($cond:expr) => {
        if !($cond) {
            $crate::contract::violation(::core::file!(), ::core::line!());
        }
    };
}

/// Report a contract violation
///
/// Called by [`contract_check!`](crate::contract_check); not meant to be
/// called directly.
#[cold]
#[inline(never)]
pub fn violation(file: &'static str, line: u32) {
    #[cfg(feature = "defmt")]
    defmt::error!("contract violation at {=str}:{=u32}", file, line);

    #[cfg(any(test, feature = "test-hooks"))]
    {
        let _ = (file, line);
        VIOLATIONS.fetch_add(1, Ordering::Relaxed);
    }

    #[cfg(not(any(test, feature = "test-hooks")))]
    panic!("contract violation at {}:{}", file, line);
}

/// Total number of violations recorded since start-up
///
/// Monotonic and shared by every driver in the process, so tests should
/// compare against a value read before the operation under test.
#[cfg(any(test, feature = "test-hooks"))]
pub fn violations() -> u32 {
    VIOLATIONS.load(Ordering::Relaxed)
}
