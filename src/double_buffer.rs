//! Writer-shared surface and the refresh cycle's snapshot.
//!
//! [`SharedSurface`] is the only state touched by both the application and
//! the refresh task. It is guarded by an `embassy-sync` blocking mutex, so the
//! raw mutex type decides where writers may run from: use
//! `CriticalSectionRawMutex` when drawing from interrupts or another core,
//! `NoopRawMutex` when everything runs on one executor.
//!
//! The refresh task copies the surface into its [`DoubleBuffer`] once per
//! cycle. The guard is held for the copy only, so a writer waits at most one
//! copy and never a full encode-and-transmit cycle. A snapshot may fall
//! between two halves of a multi-pixel drawing operation; such tearing fixes
//! itself on the next cycle.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::surface::{PixelSurface, Snapshot};

/// Pixel surface shared between the application and the refresh task.
pub struct SharedSurface<M: RawMutex, const WIDTH: usize, const HEIGHT: usize, const BYTES: usize>
{
    inner: Mutex<M, RefCell<PixelSurface<WIDTH, HEIGHT, BYTES>>>,
}

impl<M: RawMutex, const WIDTH: usize, const HEIGHT: usize, const BYTES: usize> Default
    for SharedSurface<M, WIDTH, HEIGHT, BYTES>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const WIDTH: usize, const HEIGHT: usize, const BYTES: usize>
    SharedSurface<M, WIDTH, HEIGHT, BYTES>
{
    /// Create a blank shared surface. Usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(PixelSurface::new())),
        }
    }

    /// Draw on the surface.
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly from inside another `update` or `read`
    /// closure on the same surface.
    pub fn update<R>(&self, f: impl FnOnce(&mut PixelSurface<WIDTH, HEIGHT, BYTES>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Inspect the surface.
    ///
    /// # Panics
    ///
    /// Panics if called from inside an `update` closure on the same surface.
    pub fn read<R>(&self, f: impl FnOnce(&PixelSurface<WIDTH, HEIGHT, BYTES>) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn copy_into(&self, snapshot: &mut Snapshot<BYTES>) {
        self.inner
            .lock(|cell| snapshot.copy_from(cell.borrow().as_bytes()));
    }
}

/// Snapshot side of the double buffer, owned by the refresh task.
///
/// No write path to the surface goes through here.
pub struct DoubleBuffer<
    'a,
    M: RawMutex,
    const WIDTH: usize,
    const HEIGHT: usize,
    const BYTES: usize,
> {
    surface: &'a SharedSurface<M, WIDTH, HEIGHT, BYTES>,
    snapshot: Snapshot<BYTES>,
}

impl<'a, M: RawMutex, const WIDTH: usize, const HEIGHT: usize, const BYTES: usize>
    DoubleBuffer<'a, M, WIDTH, HEIGHT, BYTES>
{
    /// Attach to `surface`.
    #[must_use]
    pub const fn new(surface: &'a SharedSurface<M, WIDTH, HEIGHT, BYTES>) -> Self {
        Self {
            surface,
            snapshot: Snapshot::new(),
        }
    }

    /// Take a consistent copy of the surface, replacing the previous one.
    pub fn snapshot(&mut self) -> &Snapshot<BYTES> {
        self.surface.copy_into(&mut self.snapshot);
        &self.snapshot
    }

    /// The copy taken by the last [`snapshot`](Self::snapshot) call.
    #[must_use]
    pub fn current(&self) -> &Snapshot<BYTES> {
        &self.snapshot
    }
}
