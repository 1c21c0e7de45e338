//! Rollback guard for blocks filled by fallible element copies.
//!
//! [`RebuildGuard`] owns a freshly allocated block while values are cloned
//! into its prefix. If a clone panics, the guard is dropped during
//! unwinding: it destroys the values built so far and returns the block to
//! the allocator, so the source container is untouched and nothing leaks.
//! In debug builds it also prints a one-line note when that happens.

#![allow(unsafe_code)]

use tidyset_alloc::{Allocation, Allocator, AllocatorAware};

/// Owns a partially built block until [`finish`](RebuildGuard::finish).
pub(crate) struct RebuildGuard<'a, T, A: Allocator> {
    base: &'a AllocatorAware<A>,
    allocation: Allocation<T>,
    /// Length of the initialized prefix.
    built: usize,
    #[cfg(debug_assertions)]
    operation: &'static str,
}

impl<'a, T, A: Allocator> RebuildGuard<'a, T, A> {
    /// Take ownership of an empty `allocation` obtained through `base`.
    ///
    /// `operation` names the caller in debug diagnostics.
    pub(crate) fn new(
        base: &'a AllocatorAware<A>,
        allocation: Allocation<T>,
        #[cfg_attr(not(debug_assertions), allow(unused_variables))] operation: &'static str,
    ) -> Self {
        Self {
            base,
            allocation,
            built: 0,
            #[cfg(debug_assertions)]
            operation,
        }
    }

    /// Append `value` to the initialized prefix.
    ///
    /// # Panics
    ///
    /// If the block is already full.
    pub(crate) fn push(&mut self, value: T) {
        assert!(
            self.built < self.allocation.capacity(),
            "rebuild guard overfilled"
        );
        // SAFETY: `built < capacity`, so the slot is inside the block, and
        // slots at or past `built` are uninitialized.
        unsafe {
            self.base
                .construct(self.allocation.as_mut_ptr().add(self.built), value)
        };
        self.built += 1;
    }

    /// Number of values built so far.
    pub(crate) fn built(&self) -> usize {
        self.built
    }

    /// Hand the block and its initialized length to the caller, disarming
    /// the guard.
    pub(crate) fn finish(mut self) -> (Allocation<T>, usize) {
        let built = std::mem::take(&mut self.built);
        (self.allocation.take(), built)
    }
}

impl<T, A: Allocator> Drop for RebuildGuard<'_, T, A> {
    fn drop(&mut self) {
        if self.allocation.is_empty() {
            return;
        }
        #[cfg(debug_assertions)]
        eprintln!(
            "tidyset: {} rolled back, {}/{} elements destroyed",
            self.operation,
            self.built,
            self.allocation.capacity(),
        );
        let prefix =
            std::ptr::slice_from_raw_parts_mut(self.allocation.as_mut_ptr(), self.built);
        self.built = 0;
        // SAFETY: exactly the first `built` slots were initialized by `push`
        // and nothing else refers to them.
        unsafe { std::ptr::drop_in_place(prefix) };
        self.base.deallocate(&mut self.allocation);
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    use tidyset_alloc::LinearAllocator;

    use super::*;

    #[test]
    fn finish_hands_over_block() {
        let base = AllocatorAware::new(LinearAllocator::new(64).unwrap());
        let block = base.allocate::<u32>(4).unwrap();
        let mut guard = RebuildGuard::new(&base, block, "test");
        guard.push(7);
        guard.push(9);
        assert_eq!(guard.built(), 2);
        let (mut block, built) = guard.finish();
        assert_eq!(built, 2);
        assert_eq!(block.capacity(), 4);
        assert_eq!(base.allocator().live_allocations(), 1);
        base.deallocate(&mut block);
    }

    #[test]
    fn drop_destroys_prefix_and_frees_block() {
        let base = AllocatorAware::new(LinearAllocator::new(256).unwrap());
        let token = Rc::new(());
        {
            let block = base.allocate::<Rc<()>>(4).unwrap();
            let mut guard = RebuildGuard::new(&base, block, "test");
            guard.push(Rc::clone(&token));
            guard.push(Rc::clone(&token));
            assert_eq!(Rc::strong_count(&token), 3);
        }
        assert_eq!(Rc::strong_count(&token), 1);
        assert_eq!(base.allocator().live_allocations(), 0);
    }

    #[test]
    fn unwinding_through_guard_cleans_up() {
        let base = AllocatorAware::new(LinearAllocator::new(256).unwrap());
        let token = Rc::new(());
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let block = base.allocate::<Rc<()>>(3).unwrap();
            let mut guard = RebuildGuard::new(&base, block, "test");
            guard.push(Rc::clone(&token));
            panic!("clone failed");
        }));
        assert!(result.is_err());
        assert_eq!(Rc::strong_count(&token), 1);
        assert_eq!(base.allocator().metrics().bytes_in_use, 0);
    }

    #[test]
    #[should_panic(expected = "overfilled")]
    fn pushing_past_capacity_panics() {
        let base = AllocatorAware::<tidyset_alloc::Global>::default();
        let block = base.allocate::<u8>(1).unwrap();
        let mut guard = RebuildGuard::new(&base, block, "test");
        guard.push(1);
        guard.push(2);
    }
}
