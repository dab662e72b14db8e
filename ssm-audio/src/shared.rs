//! Per-instance lock for drivers reached from more than one context.
//!
//! A driver's `&mut self` methods already serialize access when there is a
//! single owner. When a mixer task and a stream task both need the same chip,
//! wrap it in a [`SharedCodec`]: every [`lock`](SharedCodec::lock) closure runs
//! with the chip exclusively borrowed, so a read-modify-write or a power
//! transition cannot interleave with another caller. Separate chips get
//! separate `SharedCodec`s and never contend.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// A codec driver behind a blocking mutex.
pub struct SharedCodec<M: RawMutex, C> {
    inner: Mutex<M, RefCell<C>>,
}

impl<M: RawMutex, C> SharedCodec<M, C> {
    pub const fn new(codec: C) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(codec)),
        }
    }

    /// Run `f` with exclusive access to the codec.
    ///
    /// Calling `lock` again from inside `f` on the same instance panics.
    pub fn lock<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Direct access when the caller already holds `&mut self`.
    pub fn get_mut(&mut self) -> &mut C {
        self.inner.get_mut().get_mut()
    }

    pub fn into_inner(self) -> C {
        self.inner.into_inner().into_inner()
    }
}
