//! Volatile register access

use core::ptr::{read_volatile, write_volatile};

/// Read a 32-bit register
///
/// # Safety
/// `addr` must be a valid, aligned peripheral register address.
#[inline(always)]
pub unsafe fn read32(addr: usize) -> u32 {
    read_volatile(addr as *const u32)
}

/// Write a 32-bit register
///
/// # Safety
/// `addr` must be a valid, aligned peripheral register address.
#[inline(always)]
pub unsafe fn write32(addr: usize, value: u32) {
    write_volatile(addr as *mut u32, value)
}

/// Read-modify-write a 32-bit register
///
/// # Safety
/// As [`read32`]; the caller must also make sure no interrupt touches the
/// same register between the read and the write.
#[inline(always)]
pub unsafe fn modify32(addr: usize, f: impl FnOnce(u32) -> u32) {
    write32(addr, f(read32(addr)))
}

/// Read an 8-bit register
///
/// # Safety
/// `addr` must be a valid peripheral register address.
#[inline(always)]
pub unsafe fn read8(addr: usize) -> u8 {
    read_volatile(addr as *const u8)
}

/// Write an 8-bit register
///
/// # Safety
/// `addr` must be a valid peripheral register address.
#[inline(always)]
pub unsafe fn write8(addr: usize, value: u8) {
    write_volatile(addr as *mut u8, value)
}
