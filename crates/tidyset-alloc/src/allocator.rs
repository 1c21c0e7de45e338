//! The allocator capability consumed by containers.
//!
//! An [`Allocator`] hands out and takes back raw byte blocks. Typed
//! construction and destruction are done by the container through
//! [`AllocatorAware`](crate::AllocatorAware); the allocator itself never
//! sees element values.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

use tidyset_core::AllocError;

use crate::raw;

/// A source of raw storage.
///
/// # Safety
///
/// Containers write elements through the pointers this trait returns, so an
/// implementation must uphold:
///
/// - a block returned by `allocate` is valid for reads and writes of
///   `layout.size()` bytes and aligned to `layout.align()`;
/// - the block stays live, and is not handed out again, until it is passed
///   back to `deallocate`;
/// - two allocator values that compare equal (`==`) can free each other's
///   blocks, and a clone compares equal to its source;
/// - `max_size` never reports less than a request `allocate` would serve.
///
/// Containers rely on compatibility when they clone, swap or move their
/// allocator along with their storage.
///
/// An implementation without `unsafe` is rejected:
///
/// ```compile_fail
/// use std::alloc::Layout;
/// use std::ptr::NonNull;
/// use tidyset_alloc::{AllocError, Allocator};
///
/// #[derive(Clone, PartialEq)]
/// struct Dangling;
///
/// impl Allocator for Dangling {
///     fn allocate(&self, _: Layout) -> Result<NonNull<u8>, AllocError> {
///         Ok(NonNull::dangling())
///     }
///     unsafe fn deallocate(&self, _: NonNull<u8>, _: Layout) {}
/// }
/// ```
///
/// # Cloning
///
/// `Clone` is the "copy the allocator" operation a container performs when
/// it is itself cloned.
pub unsafe trait Allocator: Clone + PartialEq {
    /// Allocate a block fitting `layout`.
    ///
    /// Containers never request zero-sized blocks, but implementations
    /// should serve them with a dangling, aligned pointer.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block to this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator (or
    /// one comparing equal to it) with the same `layout`, and must not be
    /// used or freed again afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Largest number of bytes a single request may ask for.
    fn max_size(&self) -> usize {
        isize::MAX as usize
    }
}

/// The process-wide allocator (`std::alloc`).
///
/// Stateless; all instances compare equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Global;

// SAFETY: blocks come from `std::alloc` with the requested layout and live
// until `deallocate`; all `Global` values share one heap.
unsafe impl Allocator for Global {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        raw::global_alloc(layout).ok_or(AllocError::OutOfMemory {
            requested: layout.size(),
            available: usize::MAX,
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller; `Global` blocks come from
        // `raw::global_alloc`.
        unsafe { raw::global_dealloc(ptr, layout) }
    }
}
