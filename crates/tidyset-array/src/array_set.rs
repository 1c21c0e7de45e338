//! The sorted flat set.
//!
//! Elements live in the prefix `[0, len)` of one block obtained through the
//! set's allocator. After every public operation, whether it returns or
//! unwinds:
//!
//! 1. `len <= capacity`;
//! 2. the prefix is sorted under the comparator;
//! 3. no two elements in the prefix are equivalent;
//! 4. the set holds storage iff `capacity > 0`.
//!
//! Positions are plain indices. Any growth invalidates all of them; an
//! insertion or removal invalidates those at or after the affected slot.

#![allow(unsafe_code)]

use std::borrow::Borrow;
use std::fmt;
use std::ops::{Bound, Index, RangeBounds};
use std::ptr;
use std::slice;

use tidyset_alloc::{Allocation, Allocator, AllocatorAware, Global};
use tidyset_core::{search, Compare, Less, SetError};

use crate::guard::RebuildGuard;
use crate::iter::{IntoIter, Iter};

/// Capacity to grow to from `n` slots: doubling, saturating at
/// `usize::MAX`, and 1 for an empty block.
fn grow_size(n: usize) -> usize {
    match n {
        0 => 1,
        n if n > usize::MAX / 2 => usize::MAX,
        n => n * 2,
    }
}

/// Unwrap a result on an infallible-by-signature path, panicking with the
/// error message as `Vec` does on allocation failure.
fn or_panic<R>(result: Result<R, SetError>) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("tidyset: {err}"),
    }
}

/// A set stored as a sorted, contiguous, duplicate-free array.
///
/// `C` orders the elements (see [`Compare`]); two elements `a`, `b` are
/// duplicates when neither is less than the other. `A` supplies storage.
///
/// ```
/// use tidyset_array::ArraySet;
///
/// let mut set = ArraySet::new();
/// for v in [5, 3, 5, 1, 4] {
///     set.insert(v)?;
/// }
/// assert_eq!(set.as_slice(), &[1, 3, 4, 5]);
/// assert_eq!(set.find(&4), Some(2));
/// # Ok::<(), tidyset_array::SetError>(())
/// ```
pub struct ArraySet<T, C = Less, A: Allocator = Global> {
    base: AllocatorAware<A>,
    allocation: Allocation<T>,
    len: usize,
    comparator: C,
}

impl<T> ArraySet<T> {
    /// An empty set in natural order. Does not allocate.
    pub fn new() -> Self {
        Self::with_comparator_in(Less, Global)
    }
}

impl<T, C> ArraySet<T, C> {
    /// An empty set ordered by `comparator`. Does not allocate.
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_comparator_in(comparator, Global)
    }
}

impl<T, A: Allocator> ArraySet<T, Less, A> {
    /// An empty set in natural order drawing storage from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Self::with_comparator_in(Less, alloc)
    }
}

impl<T, C, A: Allocator> ArraySet<T, C, A> {
    /// An empty set ordered by `comparator`, drawing storage from `alloc`.
    pub fn with_comparator_in(comparator: C, alloc: A) -> Self {
        Self {
            base: AllocatorAware::new(alloc),
            allocation: Allocation::empty(),
            len: 0,
            comparator,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current block can hold.
    pub fn capacity(&self) -> usize {
        self.allocation.capacity()
    }

    /// Largest number of elements the set could ever hold: the smaller of
    /// the address-space ceiling and what the allocator will serve.
    pub fn max_size(&self) -> usize {
        self.base.max_elements::<T>()
    }

    /// The elements, in order.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is initialized; an empty set yields a dangling,
        // aligned pointer with length 0.
        unsafe { slice::from_raw_parts(self.allocation.as_ptr(), self.len) }
    }

    /// Raw pointer to the first element (dangling when there is no block).
    pub fn data(&self) -> *const T {
        self.allocation.as_ptr()
    }

    /// The active comparator.
    pub fn value_comp(&self) -> &C {
        &self.comparator
    }

    /// The active allocator.
    pub fn allocator(&self) -> &A {
        self.base.allocator()
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Smallest element.
    pub fn first(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// Largest element.
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Make room for at least `n` elements in total.
    ///
    /// A no-op when `n <= capacity()`. Otherwise the elements move to a new
    /// block of exactly `n` slots. On error nothing changes.
    pub fn reserve(&mut self, n: usize) -> Result<(), SetError> {
        if n <= self.capacity() {
            return Ok(());
        }
        let max = self.max_size();
        if n > max {
            return Err(SetError::CapacityExceeded { requested: n, max });
        }
        self.relocate(n)
    }

    /// Release unused capacity. An empty set gives up its block entirely.
    pub fn shrink_to_fit(&mut self) -> Result<(), SetError> {
        if self.capacity() == self.len {
            return Ok(());
        }
        if self.len == 0 {
            self.base.deallocate(&mut self.allocation);
            return Ok(());
        }
        self.relocate(self.len)
    }

    /// Remove and return the element at `index`, shifting later elements
    /// left by one.
    pub fn erase(&mut self, index: usize) -> Result<T, SetError> {
        if index >= self.len {
            return Err(SetError::ContractViolation {
                operation: "erase",
                index,
                len: self.len,
            });
        }
        let base = self.allocation.as_mut_ptr();
        // SAFETY: `index < len`. The value is read out, then the tail
        // `[index + 1, len)` slides over its slot; the old last slot is
        // dropped from the live range by the length update.
        let value = unsafe {
            let slot = base.add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, self.len - index - 1);
            value
        };
        self.len -= 1;
        Ok(value)
    }

    /// Drop every element in `range`, shifting the tail left.
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<(), SetError> {
        let start = match range.start_bound() {
            Bound::Included(&s) => s,
            Bound::Excluded(&s) => s.saturating_add(1),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&e) => e.saturating_add(1),
            Bound::Excluded(&e) => e,
            Bound::Unbounded => self.len,
        };
        if start > end || end > self.len {
            return Err(SetError::ContractViolation {
                operation: "erase_range",
                index: if end > self.len { end } else { start },
                len: self.len,
            });
        }
        let len = self.len;
        let base = self.allocation.as_mut_ptr();
        // A panicking destructor leaks the tail rather than exposing
        // dropped slots.
        self.len = start;
        // SAFETY: `[start, end)` is initialized and now outside the live
        // range; the tail `[end, len)` then moves down to `start`.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), len - end);
        }
        self.len = start + (len - end);
        Ok(())
    }

    /// Drop every element and release the block. Capacity becomes 0.
    pub fn clear(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.allocation.as_mut_ptr(), self.len);
        self.len = 0;
        // SAFETY: `live` was exactly the initialized prefix and is no longer
        // reachable through `len`.
        unsafe { ptr::drop_in_place(live) };
        self.base.deallocate(&mut self.allocation);
    }

    /// Exchange contents, comparators and allocators with `other`.
    pub fn swap(&mut self, other: &mut Self) {
        self.base.swap(&mut other.base);
        std::mem::swap(&mut self.allocation, &mut other.allocation);
        std::mem::swap(&mut self.len, &mut other.len);
        std::mem::swap(&mut self.comparator, &mut other.comparator);
    }

    /// Move the live prefix into a fresh block of `capacity` slots.
    fn relocate(&mut self, capacity: usize) -> Result<(), SetError> {
        debug_assert!(capacity >= self.len);
        let mut fresh = self.base.allocate::<T>(capacity)?;
        // SAFETY: the blocks are distinct and both hold at least `len`
        // slots; the bitwise copy moves the values, and the old block is
        // released without dropping them.
        unsafe {
            ptr::copy_nonoverlapping(self.allocation.as_ptr(), fresh.as_mut_ptr(), self.len);
        }
        let mut old = self.allocation.replace(fresh);
        self.base.deallocate(&mut old);
        Ok(())
    }

    /// Copy the elements into a fresh block from `base`. A panicking
    /// `clone` unwinds through the rebuild guard.
    fn clone_storage<B: Allocator>(
        &self,
        base: &AllocatorAware<B>,
    ) -> Result<Allocation<T>, SetError>
    where
        T: Clone,
    {
        let block = base.allocate::<T>(self.len)?;
        let mut guard = RebuildGuard::new(base, block, "ArraySet::clone");
        for value in self.as_slice() {
            guard.push(value.clone());
        }
        debug_assert_eq!(guard.built(), self.len);
        let (allocation, _) = guard.finish();
        Ok(allocation)
    }

    /// Copy the set into storage from `alloc`.
    ///
    /// The comparator is cloned. On allocation failure `self` is untouched
    /// and nothing is leaked.
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> Result<ArraySet<T, C, B>, SetError>
    where
        T: Clone,
        C: Clone,
    {
        let base = AllocatorAware::new(alloc);
        let allocation = self.clone_storage(&base)?;
        Ok(ArraySet {
            base,
            allocation,
            len: self.len,
            comparator: self.comparator.clone(),
        })
    }

    /// Copy the set, with a clone of its allocator.
    pub fn try_clone(&self) -> Result<Self, SetError>
    where
        T: Clone,
        C: Clone,
    {
        let base = self.base.select_on_copy();
        let allocation = self.clone_storage(&base)?;
        Ok(Self {
            base,
            allocation,
            len: self.len,
            comparator: self.comparator.clone(),
        })
    }
}

impl<T, C: Compare<T>, A: Allocator> ArraySet<T, C, A> {
    /// Build a set from `iter`, inserting one value at a time.
    ///
    /// Of several equivalent inputs the first one is kept.
    pub fn try_from_iter_in<I>(iter: I, comparator: C, alloc: A) -> Result<Self, SetError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = Self::with_comparator_in(comparator, alloc);
        set.extend_from_iter(iter)?;
        Ok(set)
    }

    /// Position of the first element not less than `key`: where `key` is
    /// or would be.
    pub fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        search::binary_search(self.as_slice(), key, |e: &T, k: &Q| {
            <C as Compare<Q>>::less(&self.comparator, e.borrow(), k)
        })
    }

    /// Index of the element equivalent to `key`.
    pub fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let p = self.lower_bound(key);
        let hit = self.as_slice().get(p).is_some_and(|e: &T| {
            <C as Compare<Q>>::equivalent(&self.comparator, e.borrow(), key)
        });
        hit.then_some(p)
    }

    /// The element equivalent to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find(key).map(|p| &self.as_slice()[p])
    }

    /// Whether an element equivalent to `key` is present.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.find(key).is_some()
    }

    /// Insert `value` at its sorted position.
    ///
    /// Returns the element's index and `true`, or, when an equivalent
    /// element is already present, that element's index and `false` (the
    /// existing element is kept and `value` is dropped). On error the set
    /// is unchanged.
    pub fn insert(&mut self, value: T) -> Result<(usize, bool), SetError> {
        let p = self.lower_bound(&value);
        if self.equivalent_at(p, &value) {
            return Ok((p, false));
        }
        self.insert_at(p, value)?;
        Ok((p, true))
    }

    /// Insert `value`, trying `hint` as its position first.
    ///
    /// A correct hint skips the search; a wrong one falls back to
    /// [`insert`](Self::insert).
    pub fn insert_hint(&mut self, hint: usize, value: T) -> Result<(usize, bool), SetError> {
        let slice = self.as_slice();
        let fits = hint <= self.len
            && (hint == 0 || self.comparator.less(&slice[hint - 1], &value))
            && (hint == self.len || !self.comparator.less(&slice[hint], &value));
        if !fits {
            return self.insert(value);
        }
        if self.equivalent_at(hint, &value) {
            return Ok((hint, false));
        }
        self.insert_at(hint, value)?;
        Ok((hint, true))
    }

    /// Insert every value from `iter`.
    ///
    /// Values are inserted one at a time; on error the values inserted so
    /// far stay in the set and the rest are dropped.
    pub fn extend_from_iter<I>(&mut self, iter: I) -> Result<(), SetError>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Replace the contents with the values from `iter`.
    ///
    /// The new contents are built in fresh storage from a clone of the
    /// allocator first, so on error the set is unchanged.
    pub fn assign<I>(&mut self, iter: I) -> Result<(), SetError>
    where
        I: IntoIterator<Item = T>,
        C: Clone,
    {
        let fresh =
            Self::try_from_iter_in(iter, self.comparator.clone(), self.allocator().clone())?;
        *self = fresh;
        Ok(())
    }

    /// Remove the element equivalent to `key`. Returns how many elements
    /// were removed (0 or 1).
    pub fn remove<Q>(&mut self, key: &Q) -> usize
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        usize::from(self.take(key).is_some())
    }

    /// Remove and return the element equivalent to `key`.
    pub fn take<Q>(&mut self, key: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let p = self.find(key)?;
        self.erase(p).ok()
    }

    /// Whether the element at `p` (if any) is equivalent to `value`.
    fn equivalent_at(&self, p: usize, value: &T) -> bool {
        self.as_slice()
            .get(p)
            .is_some_and(|e| self.comparator.equivalent(e, value))
    }

    /// Place `value` at index `p`, shifting `[p, len)` right, growing the
    /// block first if it is full.
    fn insert_at(&mut self, p: usize, value: T) -> Result<(), SetError> {
        debug_assert!(p <= self.len);
        if self.len < self.capacity() {
            let base = self.allocation.as_mut_ptr();
            // SAFETY: `len < capacity`, so `[p + 1, len + 1)` is inside the
            // block. After the overlapping shift, slot `p` holds a stale
            // bitwise copy and is overwritten without being dropped.
            unsafe {
                let slot = base.add(p);
                ptr::copy(slot, slot.add(1), self.len - p);
                self.base.construct(slot, value);
            }
            self.len += 1;
            return Ok(());
        }

        let capacity = self.grown_capacity()?;
        // Allocation is the only step that can fail; nothing has moved yet.
        let mut fresh = self.base.allocate::<T>(capacity)?;
        let src = self.allocation.as_ptr();
        let dst = fresh.as_mut_ptr();
        // SAFETY: the blocks are distinct; the new one holds `len + 1 <=
        // capacity` slots. Prefix and suffix are moved bitwise around the
        // new value, and the old block is released without dropping them.
        unsafe {
            ptr::copy_nonoverlapping(src, dst, p);
            self.base.construct(dst.add(p), value);
            ptr::copy_nonoverlapping(src.add(p), dst.add(p + 1), self.len - p);
        }
        let mut old = self.allocation.replace(fresh);
        self.base.deallocate(&mut old);
        self.len += 1;
        Ok(())
    }

    /// Capacity for a full set about to take one more element.
    fn grown_capacity(&self) -> Result<usize, SetError> {
        let max = self.max_size();
        let required = self.len.saturating_add(1);
        if required > max {
            return Err(SetError::CapacityExceeded {
                requested: required,
                max,
            });
        }
        Ok(grow_size(self.capacity()).min(max).max(required))
    }
}

impl<T, C, A: Allocator> Drop for ArraySet<T, C, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for ArraySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C: Clone, A: Allocator> Clone for ArraySet<T, C, A> {
    /// Copy the set with a clone of its allocator.
    ///
    /// # Panics
    ///
    /// If the allocator cannot provide the storage.
    fn clone(&self) -> Self {
        or_panic(self.try_clone())
    }

    /// Free the current storage through the current allocator, adopt a
    /// clone of `source`'s allocator and comparator, then copy.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.base.replace_allocator(source.allocator().clone());
        self.comparator.clone_from(&source.comparator);
        self.allocation = or_panic(source.clone_storage(&self.base));
        self.len = source.len;
    }
}

impl<T: fmt::Debug, C, A: Allocator> fmt::Debug for ArraySet<T, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C, A: Allocator, B: Allocator> PartialEq<ArraySet<T, C, B>>
    for ArraySet<T, C, A>
{
    fn eq(&self, other: &ArraySet<T, C, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, C, A: Allocator> Eq for ArraySet<T, C, A> {}

impl<T, C, A: Allocator> Index<usize> for ArraySet<T, C, A> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T, C: Compare<T>, A: Allocator> Extend<T> for ArraySet<T, C, A> {
    /// # Panics
    ///
    /// If the allocator cannot provide storage.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        or_panic(self.extend_from_iter(iter));
    }
}

impl<T, C: Compare<T> + Default, A: Allocator + Default> FromIterator<T> for ArraySet<T, C, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        or_panic(Self::try_from_iter_in(iter, C::default(), A::default()))
    }
}

impl<T: Ord, const N: usize> From<[T; N]> for ArraySet<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<'a, T, C, A: Allocator> IntoIterator for &'a ArraySet<T, C, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C, A: Allocator> IntoIterator for ArraySet<T, C, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// The iterator takes the block and a compatible copy of the
    /// allocator; the emptied set then drops without freeing anything.
    fn into_iter(mut self) -> IntoIter<T, A> {
        let allocation = self.allocation.take();
        let len = std::mem::take(&mut self.len);
        IntoIter::new(self.base.select_on_copy(), allocation, len)
    }
}
