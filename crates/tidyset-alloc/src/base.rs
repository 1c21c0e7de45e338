//! The allocator-aware base every container embeds.
//!
//! [`AllocatorAware`] holds exactly one allocator instance and is the only
//! path through which a container obtains, releases, fills and empties
//! storage. It also fixes how the allocator travels when the owning
//! container is copied, moved or swapped:
//!
//! | Container operation | Allocator |
//! |---|---|
//! | clone | cloned from the source ([`AllocatorAware::select_on_copy`]) |
//! | copy-assign (`clone_from`) | source allocator cloned in, after the old storage was released through the old one |
//! | move | moves with the container |
//! | swap | swapped along with the storage ([`AllocatorAware::swap`]) |
//!
//! Because the allocator always travels with the storage it produced,
//! every block is released through an allocator compatible with the one
//! that allocated it.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::mem;
use std::ptr::{self, NonNull};

use tidyset_core::AllocError;

use crate::allocation::Allocation;
use crate::allocator::{Allocator, Global};

/// One allocator instance plus typed allocate/deallocate/construct/destroy.
#[derive(Debug, Default)]
pub struct AllocatorAware<A: Allocator = Global> {
    alloc: A,
}

impl<A: Allocator> AllocatorAware<A> {
    /// Wrap an allocator instance.
    pub fn new(alloc: A) -> Self {
        Self { alloc }
    }

    /// The active allocator.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Base for a copy of the owning container: the allocator is cloned.
    pub fn select_on_copy(&self) -> Self {
        Self {
            alloc: self.alloc.clone(),
        }
    }

    /// Swap allocators with `other`. The caller must swap the storage in the
    /// same step so each block stays with the allocator that produced it.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.alloc, &mut other.alloc);
    }

    /// Replace the allocator. The caller must have released every block
    /// obtained through the old one.
    pub fn replace_allocator(&mut self, alloc: A) -> A {
        mem::replace(&mut self.alloc, alloc)
    }

    /// Whether blocks from `other` can be released through this base.
    pub fn is_compatible(&self, other: &Self) -> bool {
        self.alloc == other.alloc
    }

    /// Largest element count a single block of `T` may hold: the smaller of
    /// the address-space ceiling and the allocator's own limit.
    pub fn max_elements<T>(&self) -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            size => (isize::MAX as usize / size).min(self.alloc.max_size() / size),
        }
    }

    /// Allocate an uninitialized block for `n` values of `T`.
    ///
    /// `n == 0` yields an empty handle without calling the allocator, and
    /// zero-sized `T` never calls it either.
    pub fn allocate<T>(&self, n: usize) -> Result<Allocation<T>, AllocError> {
        if n == 0 {
            return Ok(Allocation::empty());
        }
        if mem::size_of::<T>() == 0 {
            return Ok(Allocation::from_raw_parts(NonNull::dangling(), n));
        }
        let layout = Layout::array::<T>(n).map_err(|_| AllocError::CapacityOverflow)?;
        if layout.size() > self.alloc.max_size() {
            return Err(AllocError::OutOfMemory {
                requested: layout.size(),
                available: self.alloc.max_size(),
            });
        }
        let ptr = self.alloc.allocate(layout)?;
        Ok(Allocation::from_raw_parts(ptr.cast(), n))
    }

    /// Release `allocation` and leave the handle empty. Releasing an empty
    /// handle is a no-op. Live values in the block are not dropped.
    pub fn deallocate<T>(&self, allocation: &mut Allocation<T>) {
        let allocation = allocation.take();
        if let Some((ptr, layout)) = allocation.block() {
            // SAFETY: every non-empty handle is produced by `allocate` on an
            // allocator that travelled with it, so `self.alloc` is
            // compatible, and `take` guarantees it is released only once.
            unsafe { self.alloc.deallocate(ptr, layout) };
        }
    }

    /// Construct `value` in place at `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes, properly aligned, and must not hold
    /// a live value (it would be leaked).
    pub unsafe fn construct<T>(&self, slot: *mut T, value: T) {
        // SAFETY: forwarded from the caller.
        unsafe { ptr::write(slot, value) }
    }

    /// Drop the value at `slot` in place, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used again afterwards.
    pub unsafe fn destroy<T>(&self, slot: *mut T) {
        // SAFETY: forwarded from the caller.
        unsafe { ptr::drop_in_place(slot) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinearAllocator;

    #[test]
    fn zero_count_does_not_allocate() {
        let base = AllocatorAware::new(LinearAllocator::new(64).unwrap());
        let a = base.allocate::<u32>(0).unwrap();
        assert!(a.is_empty());
        assert_eq!(base.allocator().metrics().allocations, 0);
    }

    #[test]
    fn zero_sized_type_does_not_allocate() {
        let base = AllocatorAware::new(LinearAllocator::new(0).unwrap());
        let mut a = base.allocate::<()>(1000).unwrap();
        assert_eq!(a.capacity(), 1000);
        base.deallocate(&mut a);
        assert_eq!(base.allocator().metrics().allocations, 0);
    }

    #[test]
    fn deallocate_empties_handle_once() {
        let base = AllocatorAware::new(LinearAllocator::new(256).unwrap());
        let mut a = base.allocate::<u64>(4).unwrap();
        assert_eq!(a.capacity(), 4);
        base.deallocate(&mut a);
        assert!(a.is_empty());
        // Second release is a no-op.
        base.deallocate(&mut a);
        assert_eq!(base.allocator().metrics().deallocations, 1);
    }

    #[test]
    fn construct_and_destroy_round_trip() {
        let base = AllocatorAware::<Global>::default();
        let mut a = base.allocate::<String>(2).unwrap();
        let p = a.as_mut_ptr();
        // SAFETY: slot 0 is in bounds and uninitialized; destroyed once below.
        unsafe {
            base.construct(p, String::from("hello"));
            assert_eq!(&*p, "hello");
            base.destroy(p);
        }
        base.deallocate(&mut a);
    }

    #[test]
    fn replace_allocator_hands_back_the_old_one() {
        let first = LinearAllocator::new(64).unwrap();
        let second = LinearAllocator::new(64).unwrap();
        let mut base = AllocatorAware::new(first.clone());
        let mut a = base.allocate::<u32>(4).unwrap();
        base.deallocate(&mut a);

        let old = base.replace_allocator(second.clone());
        assert_eq!(old, first);
        assert_eq!(base.allocator(), &second);
        assert!(!base.is_compatible(&AllocatorAware::new(first)));
    }

    #[test]
    fn max_elements_respects_allocator_limit() {
        let base = AllocatorAware::new(LinearAllocator::new(100).unwrap());
        assert_eq!(base.max_elements::<u32>(), 25);
        assert_eq!(base.max_elements::<()>(), usize::MAX);
        let global = AllocatorAware::<Global>::default();
        assert_eq!(global.max_elements::<u64>(), isize::MAX as usize / 8);
    }

    #[test]
    fn request_beyond_allocator_limit_is_refused_up_front() {
        let base = AllocatorAware::new(LinearAllocator::new(16).unwrap());
        let err = base.allocate::<u64>(3).unwrap_err();
        assert_eq!(
            err,
            AllocError::OutOfMemory {
                requested: 24,
                available: 16
            }
        );
    }

    #[test]
    fn overflowing_count_is_capacity_overflow() {
        let base = AllocatorAware::<Global>::default();
        let err = base.allocate::<u64>(usize::MAX).unwrap_err();
        assert_eq!(err, AllocError::CapacityOverflow);
    }

    #[test]
    fn copy_and_swap_propagate_allocator() {
        let arena_a = LinearAllocator::new(64).unwrap();
        let arena_b = LinearAllocator::new(64).unwrap();
        let mut a = AllocatorAware::new(arena_a.clone());
        let mut b = AllocatorAware::new(arena_b.clone());

        let copy = a.select_on_copy();
        assert!(copy.is_compatible(&a));
        assert!(!a.is_compatible(&b));

        a.swap(&mut b);
        assert_eq!(a.allocator(), &arena_b);
        assert_eq!(b.allocator(), &arena_a);
    }
}
