//! Iterators over [`ArraySet`](crate::ArraySet).

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use tidyset_alloc::{Allocation, Allocator, AllocatorAware, Global};

/// Borrowing iterator over a set, in order.
pub struct Iter<'a, T> {
    inner: slice::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(slice: &'a [T]) -> Self {
        Self {
            inner: slice.iter(),
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &'a [T] {
        self.inner.as_slice()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Iter").field(&self.as_slice()).finish()
    }
}

/// Owning iterator over a set, in order.
///
/// Holds the set's block and allocator; values not yet yielded are dropped
/// and the block is returned to the allocator when the iterator drops.
pub struct IntoIter<T, A: Allocator = Global> {
    base: AllocatorAware<A>,
    allocation: Allocation<T>,
    /// Live values occupy `[front, back)`.
    front: usize,
    back: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    /// `allocation` must hold `len` initialized values in its prefix.
    pub(crate) fn new(base: AllocatorAware<A>, allocation: Allocation<T>, len: usize) -> Self {
        debug_assert!(len <= allocation.capacity());
        Self {
            base,
            allocation,
            front: 0,
            back: len,
        }
    }

    /// The values not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[front, back)` is initialized and inside the block.
        unsafe {
            slice::from_raw_parts(self.allocation.as_ptr().add(self.front), self.back - self.front)
        }
    }

    /// The allocator the block will be returned to.
    pub fn allocator(&self) -> &A {
        self.base.allocator()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: `front < back`, so the slot is initialized; advancing
        // `front` moves it out of the live range before anyone can read it
        // again.
        let value = unsafe { ptr::read(self.allocation.as_ptr().add(self.front)) };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: the old `back - 1` was initialized and is now outside the
        // live range.
        Some(unsafe { ptr::read(self.allocation.as_ptr().add(self.back)) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let rest = ptr::slice_from_raw_parts_mut(
            self.allocation.as_mut_ptr().wrapping_add(self.front),
            self.back - self.front,
        );
        self.front = self.back;
        // SAFETY: `rest` is exactly the live range, which is not read again.
        unsafe { ptr::drop_in_place(rest) };
        self.base.deallocate(&mut self.allocation);
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use tidyset_alloc::LinearAllocator;

    use crate::ArraySet;

    #[test]
    fn iter_is_ordered_and_double_ended() {
        let set: ArraySet<i32> = [4, 1, 3].into();
        let mut it = set.iter();
        assert_eq!(it.len(), 3);
        assert_eq!(it.next(), Some(&1));
        assert_eq!(it.next_back(), Some(&4));
        assert_eq!(it.as_slice(), &[3]);
    }

    #[test]
    fn iter_clones_without_cloning_elements() {
        struct Opaque(u8);
        let by_field = tidyset_core::ByFn(|a: &Opaque, b: &Opaque| a.0 < b.0);
        let mut set = ArraySet::with_comparator(by_field);
        set.extend([Opaque(2), Opaque(1)]);
        let mut it = set.iter();
        it.next();
        let copy = it.clone();
        assert_eq!(copy.as_slice().len(), 1);
        assert_eq!(copy.as_slice()[0].0, 2);
    }

    #[test]
    fn into_iter_yields_owned_values() {
        let set: ArraySet<String> = ["b", "c", "a"].map(String::from).into();
        let out: Vec<String> = set.into_iter().collect();
        assert_eq!(out, ["a", "b", "c"]);
    }

    #[test]
    fn partially_consumed_into_iter_drops_rest_and_frees() {
        let arena = LinearAllocator::new(1024).unwrap();
        let token = Rc::new(());
        let mut set = ArraySet::new_in(arena.clone());
        for i in 0..5 {
            set.insert((i, Rc::clone(&token))).unwrap();
        }
        assert_eq!(Rc::strong_count(&token), 6);

        let mut it = set.into_iter();
        let (first, _) = it.next().unwrap();
        let (last, _) = it.next_back().unwrap();
        assert_eq!((first, last), (0, 4));
        assert_eq!(it.as_slice().len(), 3);
        drop(it);

        assert_eq!(Rc::strong_count(&token), 1);
        assert_eq!(arena.live_allocations(), 0);
    }

    #[test]
    fn empty_set_into_iter_is_empty() {
        let set: ArraySet<u8> = ArraySet::new();
        assert_eq!(set.into_iter().next(), None);
    }
}
