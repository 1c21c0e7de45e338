//! Ordering comparisons over ranges and lower-bound searches.
//!
//! - [`lexicographic_compare`] and its four boolean wrappers order two
//!   ranges element by element; the first differing pair decides, and a
//!   strict prefix orders first.
//! - [`linear_search`] is a lower bound for ranges without random access.
//! - [`binary_search`] is a branchless lower bound over a sorted slice.

use std::cmp::Ordering;

/// Three-way lexicographic comparison of two ranges.
///
/// Returns `None` if the first pair that is not equal is also not
/// comparable (e.g. a NaN), since no order can be decided from it.
pub fn lexicographic_compare<I, J>(lhs: I, rhs: J) -> Option<Ordering>
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialOrd<J::Item>,
{
    let mut lhs = lhs.into_iter();
    let mut rhs = rhs.into_iter();
    loop {
        match (lhs.next(), rhs.next()) {
            (None, None) => return Some(Ordering::Equal),
            (None, Some(_)) => return Some(Ordering::Less),
            (Some(_), None) => return Some(Ordering::Greater),
            (Some(a), Some(b)) => match a.partial_cmp(&b) {
                Some(Ordering::Equal) => {}
                decided => return decided,
            },
        }
    }
}

/// `true` if `lhs` orders strictly before `rhs`.
pub fn less_than<I, J>(lhs: I, rhs: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialOrd<J::Item>,
{
    matches!(lexicographic_compare(lhs, rhs), Some(Ordering::Less))
}

/// `true` if `lhs` orders before or equal to `rhs`.
pub fn less_than_or_equal<I, J>(lhs: I, rhs: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialOrd<J::Item>,
{
    matches!(
        lexicographic_compare(lhs, rhs),
        Some(Ordering::Less | Ordering::Equal)
    )
}

/// `true` if `lhs` orders strictly after `rhs`.
pub fn greater_than<I, J>(lhs: I, rhs: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialOrd<J::Item>,
{
    matches!(lexicographic_compare(lhs, rhs), Some(Ordering::Greater))
}

/// `true` if `lhs` orders after or equal to `rhs`.
pub fn greater_than_or_equal<I, J>(lhs: I, rhs: J) -> bool
where
    I: IntoIterator,
    J: IntoIterator,
    I::Item: PartialOrd<J::Item>,
{
    matches!(
        lexicographic_compare(lhs, rhs),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

/// Advances through `range` while `less(element, value)` holds and returns
/// the number of elements skipped, i.e. the first position where the
/// predicate fails (or the length of the range).
pub fn linear_search<I, V, F>(range: I, value: &V, mut less: F) -> usize
where
    I: IntoIterator,
    V: ?Sized,
    F: FnMut(&I::Item, &V) -> bool,
{
    let mut position = 0;
    for element in range {
        if !less(&element, value) {
            break;
        }
        position += 1;
    }
    position
}

/// Returns `true` if any element of `range` is equal to `value`.
pub fn linear_find<I, V>(range: I, value: &V) -> bool
where
    I: IntoIterator,
    V: ?Sized,
    I::Item: PartialEq<V>,
{
    range.into_iter().any(|element| element == *value)
}

/// Branchless lower bound over a slice sorted under `less`.
///
/// Returns the leftmost position `p` such that every element before `p`
/// satisfies `less(element, value)` and no element from `p` onwards does.
/// The result is always in `0..=slice.len()`; `O(log n)` comparisons.
pub fn binary_search<T, V, F>(slice: &[T], value: &V, mut less: F) -> usize
where
    V: ?Sized,
    F: FnMut(&T, &V) -> bool,
{
    let mut base = 0;
    let mut size = slice.len();
    while size > 0 {
        let half = size / 2;
        let pivot = base + half;
        // Window is [base, base + size): everything before it is `less`,
        // nothing after it is.
        base += (size - half) * usize::from(less(&slice[pivot], value));
        size = half;
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower_bound(slice: &[i32], value: i32) -> usize {
        binary_search(slice, &value, |a, b| a < b)
    }

    #[test]
    fn ranges_ordered_by_first_difference() {
        assert!(less_than([1, 2, 3], [1, 3, 0]));
        assert!(!less_than([1, 3, 0], [1, 2, 3]));
        assert!(greater_than([1, 3, 0], [1, 2, 3]));
        assert!(!greater_than([1, 2, 3], [1, 3, 0]));
    }

    #[test]
    fn prefix_orders_first() {
        assert!(less_than([1, 2], [1, 2, 3]));
        assert!(greater_than([1, 2, 3], [1, 2]));
        assert!(less_than(Vec::<i32>::new(), [0]));
    }

    #[test]
    fn equal_ranges() {
        assert!(!less_than([4, 5], [4, 5]));
        assert!(less_than_or_equal([4, 5], [4, 5]));
        assert!(greater_than_or_equal([4, 5], [4, 5]));
        assert!(!greater_than([4, 5], [4, 5]));
    }

    #[test]
    fn incomparable_pair_decides_nothing() {
        assert_eq!(lexicographic_compare([1.0, f64::NAN], [1.0, 2.0]), None);
        assert!(!less_than([f64::NAN], [1.0]));
        assert!(!greater_than_or_equal([f64::NAN], [1.0]));
    }

    #[test]
    fn mixed_iterators() {
        let v = vec![1u8, 2, 3];
        assert!(less_than_or_equal(v.iter(), [1u8, 2, 4].iter()));
    }

    #[test]
    fn linear_search_stops_at_first_not_less() {
        let data = [1, 3, 5, 7];
        assert_eq!(linear_search(data, &0, |a, b| a < b), 0);
        assert_eq!(linear_search(data, &5, |a, b| a < b), 2);
        assert_eq!(linear_search(data, &6, |a, b| a < b), 3);
        assert_eq!(linear_search(data, &100, |a, b| a < b), 4);
    }

    #[test]
    fn linear_find_uses_equality() {
        assert!(linear_find([1, 2, 3], &2));
        assert!(!linear_find([1, 2, 3], &4));
        assert!(!linear_find(Vec::<i32>::new(), &0));
    }

    #[test]
    fn binary_search_empty_range() {
        assert_eq!(lower_bound(&[], 42), 0);
    }

    #[test]
    fn binary_search_edges() {
        let data = [10, 20, 30, 40, 50];
        assert_eq!(lower_bound(&data, 5), 0);
        assert_eq!(lower_bound(&data, 10), 0);
        assert_eq!(lower_bound(&data, 30), 2);
        assert_eq!(lower_bound(&data, 35), 3);
        assert_eq!(lower_bound(&data, 50), 4);
        assert_eq!(lower_bound(&data, 51), 5);
    }

    #[test]
    fn binary_search_even_length() {
        let data = [1, 2, 3, 4];
        for (i, v) in data.iter().enumerate() {
            assert_eq!(lower_bound(&data, *v), i);
        }
        assert_eq!(lower_bound(&data, 5), 4);
    }

    #[test]
    fn binary_search_heterogeneous_key() {
        let names = ["ada", "bob", "eve"];
        let pos = binary_search(&names, "bz", |a: &&str, b: &str| *a < b);
        assert_eq!(pos, 2);
    }

    #[test]
    fn binary_search_counts_logarithmic_comparisons() {
        let data: Vec<u32> = (0..1024).collect();
        let mut comparisons = 0;
        binary_search(&data, &700u32, |a, b| {
            comparisons += 1;
            a < b
        });
        assert!(comparisons <= 11, "took {comparisons} comparisons");
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn binary_search_matches_partition_point(
                mut data in proptest::collection::vec(-500i32..500, 0..64),
                value in -600i32..600,
            ) {
                data.sort_unstable();
                let expected = data.partition_point(|x| *x < value);
                prop_assert_eq!(binary_search(&data, &value, |a, b| a < b), expected);
                prop_assert_eq!(linear_search(data.iter(), &value, |a, b| **a < *b), expected);
            }

            #[test]
            fn lexicographic_matches_slice_ord(
                a in proptest::collection::vec(0u8..4, 0..6),
                b in proptest::collection::vec(0u8..4, 0..6),
            ) {
                prop_assert_eq!(lexicographic_compare(&a, &b), Some(a.cmp(&b)));
                prop_assert_eq!(less_than(&a, &b), a < b);
                prop_assert_eq!(greater_than_or_equal(&a, &b), a >= b);
            }
        }
    }
}
