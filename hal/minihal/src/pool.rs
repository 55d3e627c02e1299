//! Fixed-capacity handle pools
//!
//! Every driver owns one pool per peripheral kind. A successful `init`
//! claims the next free slot and hands the caller an opaque [`Handle`];
//! slots are never released, so the pool only grows until it is full.
//! The number of claimed slots is the allocation cursor.

use core::fmt;
use core::marker::PhantomData;

use heapless::Vec;

use crate::error::{HalError, HalResult};

/// Opaque reference to a slot in a [`HandlePool`]
///
/// The type parameter ties the handle to the entry type of the pool that
/// issued it, so a timer handle cannot be passed where a pin is expected.
pub struct Handle<T> {
    index: u8,
    _entry: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u8) -> Self {
        Self {
            index,
            _entry: PhantomData,
        }
    }

    /// Slot index inside the issuing pool
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for Handle<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Handle({=u8})", self.index);
    }
}

/// Fixed-capacity arena of driver entries
///
/// `N` is the pool capacity and must not exceed 256.
pub struct HandlePool<T, const N: usize> {
    slots: Vec<T, N>,
}

impl<T, const N: usize> Default for HandlePool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> HandlePool<T, N> {
    const CAPACITY_FITS_HANDLE: () = assert!(N <= u8::MAX as usize + 1);

    /// Create an empty pool
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS_HANDLE;
        Self { slots: Vec::new() }
    }

    /// Fail with [`HalError::PoolExhausted`] if no slot is left
    ///
    /// Drivers call this before touching the hardware so that a full pool
    /// never leaves a half-configured peripheral behind.
    pub fn ensure_free(&self) -> HalResult<()> {
        if self.slots.is_full() {
            return Err(HalError::PoolExhausted);
        }
        Ok(())
    }

    /// Claim the next slot for `entry`
    ///
    /// On a full pool the entry is dropped and the cursor is left unchanged.
    pub fn claim(&mut self, entry: T) -> HalResult<Handle<T>> {
        let index = self.slots.len();
        self.slots
            .push(entry)
            .map_err(|_| HalError::PoolExhausted)?;
        Ok(Handle::new(index as u8))
    }

    /// Look up the entry for `handle`
    ///
    /// Returns `None` if the slot has not been claimed.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slots.get(handle.index())
    }

    /// Mutable variant of [`get`](Self::get)
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots.get_mut(handle.index())
    }

    /// Iterate over claimed slots in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, entry)| (Handle::new(i as u8), entry))
    }

    /// Mutable variant of [`iter`](Self::iter)
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .map(|(i, entry)| (Handle::new(i as u8), entry))
    }

    /// Number of claimed slots (the allocation cursor)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if no slot has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Total number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Forget every claimed slot
    ///
    /// Handles issued before the reset no longer resolve until their slot
    /// is claimed again.
    #[cfg(any(test, feature = "test-hooks"))]
    pub fn reset(&mut self) {
        self.slots.clear();
    }
}
