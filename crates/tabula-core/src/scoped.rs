//! Scoped acquisition of engine handles

use std::mem::ManuallyDrop;

use crate::engine::{DocumentEngine, Handle, RangeHandle, SheetHandle};

/// A handle paired with the engine that issued it, released on drop
///
/// The guard borrows the engine mutably for its whole lifetime, so work on the
/// handle goes through [`engine`](Self::engine). Release failures cannot be
/// propagated out of `drop`; they are logged.
pub struct Scoped<'e, E, H>
where
    E: DocumentEngine + ?Sized,
    H: Into<Handle> + Copy,
{
    engine: &'e mut E,
    handle: H,
}

/// Guard over a range handle
pub type RangeGuard<'e, E> = Scoped<'e, E, RangeHandle>;

/// Guard over a sheet handle
pub type SheetGuard<'e, E> = Scoped<'e, E, SheetHandle>;

impl<'e, E, H> Scoped<'e, E, H>
where
    E: DocumentEngine + ?Sized,
    H: Into<Handle> + Copy,
{
    /// Take ownership of a freshly issued handle
    pub fn new(engine: &'e mut E, handle: H) -> Self {
        Self { engine, handle }
    }

    pub fn handle(&self) -> H {
        self.handle
    }

    /// The engine the handle belongs to
    pub fn engine(&mut self) -> &mut E {
        self.engine
    }

    /// Disarm the guard and hand the handle to the caller, who now releases it
    pub fn into_handle(self) -> H {
        let this = ManuallyDrop::new(self);
        this.handle
    }
}

impl<E, H> Drop for Scoped<'_, E, H>
where
    E: DocumentEngine + ?Sized,
    H: Into<Handle> + Copy,
{
    fn drop(&mut self) {
        let handle: Handle = self.handle.into();
        match self.engine.release(handle) {
            Ok(()) => tracing::trace!("Released {handle}"),
            Err(e) => tracing::warn!("Failed to release {handle}: {e}"),
        }
    }
}
