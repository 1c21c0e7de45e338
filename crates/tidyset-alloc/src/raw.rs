//! Low-level primitives over the process allocator.
//!
//! Every `unsafe` block in this module carries a `// SAFETY:` comment.
//! Callers outside the module only see the safe wrappers plus
//! [`global_dealloc`], whose contract mirrors `std::alloc::dealloc`.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

/// A non-null, well-aligned pointer for zero-sized requests.
///
/// Never dereferenced and never passed to `dealloc`.
pub(crate) fn dangling(align: usize) -> NonNull<u8> {
    debug_assert!(align.is_power_of_two());
    NonNull::new(ptr::without_provenance_mut(align)).unwrap_or(NonNull::dangling())
}

/// Request `layout` from the process allocator.
///
/// Zero-sized layouts are served with [`dangling`] without touching the
/// allocator. Returns `None` if the allocator reports failure.
pub(crate) fn global_alloc(layout: Layout) -> Option<NonNull<u8>> {
    if layout.size() == 0 {
        return Some(dangling(layout.align()));
    }
    // SAFETY: `layout` has a non-zero size, checked above.
    NonNull::new(unsafe { alloc::alloc(layout) })
}

/// Return a block obtained from [`global_alloc`].
///
/// # Safety
///
/// `ptr` must have been returned by [`global_alloc`] with the same `layout`
/// and must not have been freed already.
pub(crate) unsafe fn global_dealloc(ptr: NonNull<u8>, layout: Layout) {
    if layout.size() == 0 {
        return;
    }
    // SAFETY: forwarded from the caller; non-zero sized blocks came from
    // `alloc::alloc` with this exact layout.
    unsafe { alloc::dealloc(ptr.as_ptr(), layout) }
}
