//! Common error types for driver operations

use core::fmt;

/// Driver operation errors
///
/// Every failure is detected before the hardware is touched, except
/// [`HalError::Vendor`], which is reported by the vendor layer while the
/// peripheral is being committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// Parameter out of its valid range, or a handle that was never allocated
    InvalidParameter,
    /// Every slot of the driver's handle pool is in use
    PoolExhausted,
    /// Requested mode is not implemented by this driver
    NotSupported,
    /// Peripheral input clock reads as zero
    ClockUnavailable,
    /// Period is zero or does not fit the timer counter
    PeriodOutOfRange,
    /// Vendor layer returned a non-success status
    Vendor(u8),
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::PoolExhausted => write!(f, "handle pool exhausted"),
            Self::NotSupported => write!(f, "operation not supported"),
            Self::ClockUnavailable => write!(f, "peripheral clock unavailable"),
            Self::PeriodOutOfRange => write!(f, "period out of range"),
            Self::Vendor(code) => write!(f, "vendor status code: {}", code),
        }
    }
}

/// Result type for driver operations
pub type HalResult<T> = Result<T, HalError>;
