//! Move-only allocation handles.
//!
//! An [`Allocation`] records a raw, uninitialized block sized for
//! `capacity` values of `T`. It does not free itself: the owning
//! container returns it through the allocator it came from, exactly once,
//! via [`AllocatorAware::deallocate`](crate::AllocatorAware::deallocate),
//! which empties the handle so a second release is a no-op.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

/// Exclusive ownership of an uninitialized block of `capacity` slots.
///
/// Invariant: the handle holds storage iff `capacity > 0`. Handles are
/// never cloned; [`Allocation::take`] moves the block out and leaves an
/// empty handle behind.
#[must_use]
pub struct Allocation<T> {
    /// Number of element slots the block can hold.
    capacity: usize,
    /// Start of the block; `None` iff `capacity == 0`.
    ptr: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: the handle owns its block exclusively, like `Box<[T]>`.
unsafe impl<T: Send> Send for Allocation<T> {}
// SAFETY: shared access only exposes the pointer value, like `&Box<[T]>`.
unsafe impl<T: Sync> Sync for Allocation<T> {}

impl<T> Allocation<T> {
    /// An empty handle: no storage, capacity 0.
    pub const fn empty() -> Self {
        Self {
            capacity: 0,
            ptr: None,
            _owns: PhantomData,
        }
    }

    /// Wrap a block produced by an allocator.
    pub(crate) fn from_raw_parts(ptr: NonNull<T>, capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            capacity,
            ptr: Some(ptr),
            _owns: PhantomData,
        }
    }

    /// Number of element slots in the block.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this handle holds no storage.
    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Start of the block, or a dangling well-aligned pointer when empty.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
    }

    /// Mutable start of the block, or a dangling well-aligned pointer when
    /// empty.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
    }

    /// Move the block out, leaving this handle empty.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::empty())
    }

    /// Adopt `other`, returning the block previously held.
    pub fn replace(&mut self, other: Self) -> Self {
        mem::replace(self, other)
    }

    /// The pointer and layout to hand back to the allocator, if the block
    /// occupies any bytes. Zero-sized element types never do.
    pub(crate) fn block(&self) -> Option<(NonNull<u8>, Layout)> {
        let ptr = self.ptr?;
        let layout = Layout::array::<T>(self.capacity).ok()?;
        (layout.size() != 0).then(|| (ptr.cast(), layout))
    }
}

impl<T> Default for Allocation<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Allocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Allocation")
            .field("capacity", &self.capacity)
            .field("ptr", &self.ptr)
            .finish()
    }
}
