use std::alloc::{self, Layout};
use std::any;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use log::trace;

use crate::error::AllocError;

/// Owns a block of uninitialised slots for `T`.
///
/// `RawBuffer` only knows about storage: it never constructs or drops a `T`.
/// Whoever holds it tracks which slots are live. Dropping the buffer releases
/// the block and nothing else.
pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

// SAFETY: the buffer is uniquely owned, so it is as thread-safe as `T` itself.
unsafe impl<T: Send> Send for RawBuffer<T> {}
// SAFETY: shared access only hands out `*const T`, sound when `T: Sync`.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    pub(crate) const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// An empty buffer with no allocation.
    pub(crate) const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates exactly `capacity` slots.
    pub(crate) fn try_allocate(capacity: usize) -> Result<Self, AllocError> {
        let mut buf = Self::new();
        buf.try_resize(capacity)?;
        Ok(buf)
    }

    pub(crate) fn allocate(capacity: usize) -> Self {
        Self::try_allocate(capacity).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Number of slots. Zero-sized types never need storage and report
    /// `usize::MAX`.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        if Self::IS_ZST { usize::MAX } else { self.cap }
    }

    /// Pointer to slot 0. Dangling but aligned when nothing is allocated.
    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Moves the block to exactly `new_cap` slots, preserving the bytes of
    /// the first `min(cap, new_cap)` slots. A `new_cap` of zero releases the
    /// block.
    ///
    /// On error the buffer still owns its original block, unchanged.
    pub(crate) fn try_resize(&mut self, new_cap: usize) -> Result<(), AllocError> {
        if Self::IS_ZST || new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = Layout::array::<T>(new_cap).map_err(|_| AllocError::CapacityOverflow)?;
        trace!(
            "reallocating {} from {} to {} slots",
            any::type_name::<T>(),
            self.cap,
            new_cap
        );

        let new_ptr = if self.cap == 0 {
            // SAFETY: `new_layout` has non-zero size.
            unsafe { alloc::alloc(new_layout) }
        } else {
            // SAFETY: `ptr` was allocated with the layout of `cap` slots and
            // the new size is non-zero and fits in `isize`.
            unsafe { alloc::realloc(self.ptr.as_ptr().cast(), self.layout(), new_layout.size()) }
        };

        // A failed realloc leaves the old block in place, so `self` is intact.
        self.ptr = NonNull::new(new_ptr.cast())
            .ok_or(AllocError::AllocFailed { layout: new_layout })?;
        self.cap = new_cap;
        Ok(())
    }

    fn layout(&self) -> Layout {
        // SAFETY: this exact layout was validated when the block was allocated.
        unsafe { Layout::from_size_align_unchecked(self.cap * mem::size_of::<T>(), mem::align_of::<T>()) }
    }

    fn release(&mut self) {
        if Self::IS_ZST || self.cap == 0 {
            return;
        }
        trace!("releasing {} slots of {}", self.cap, any::type_name::<T>());
        // SAFETY: the block is live and was allocated with `self.layout()`.
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast(), self.layout()) };
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Turns an allocation error into the standard library's reaction: a panic
/// for overflow, `handle_alloc_error` for an exhausted allocator.
#[cold]
#[track_caller]
pub(crate) fn handle_alloc_failure(err: AllocError) -> ! {
    match err {
        AllocError::CapacityOverflow => panic!("capacity overflow"),
        AllocError::AllocFailed { layout } => alloc::handle_alloc_error(layout),
    }
}
