//! The comparator capability consumed by the sorted containers.
//!
//! A comparator is a strict weak ordering: [`Compare::less`] must be
//! irreflexive and transitive, and the equivalence it induces (neither
//! element orders before the other) must be transitive too. Containers
//! never compare elements for equality directly; they use
//! [`Compare::equivalent`].

use std::cmp::Ordering;
use std::fmt;

/// A strict weak ordering over values of type `T`.
///
/// Comparators are stored by value inside containers and cloned along with
/// them, so they may carry state (e.g. a key projection or a locale).
pub trait Compare<T: ?Sized> {
    /// Returns `true` if `a` orders strictly before `b`.
    fn less(&self, a: &T, b: &T) -> bool;

    /// Returns `true` if neither value orders before the other.
    fn equivalent(&self, a: &T, b: &T) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    /// Three-way comparison derived from [`Compare::less`].
    fn compare(&self, a: &T, b: &T) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<T: ?Sized, C: Compare<T> + ?Sized> Compare<T> for &C {
    fn less(&self, a: &T, b: &T) -> bool {
        (**self).less(a, b)
    }
}

/// Natural ascending order (`a < b` under [`Ord`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Less;

impl<T: Ord + ?Sized> Compare<T> for Less {
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Natural descending order (`a > b` under [`Ord`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Greater;

impl<T: Ord + ?Sized> Compare<T> for Greater {
    fn less(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

/// Adapts a closure `Fn(&T, &T) -> bool` into a comparator.
///
/// ```
/// use tidyset_core::{ByFn, Compare};
///
/// let by_len = ByFn(|a: &&str, b: &&str| a.len() < b.len());
/// assert!(by_len.less(&"ab", &"abc"));
/// assert!(by_len.equivalent(&"ab", &"cd"));
/// ```
#[derive(Clone, Copy, Default)]
pub struct ByFn<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Compare<T> for ByFn<F> {
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

impl<F> fmt::Debug for ByFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ByFn(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn less_follows_ord() {
        assert!(Less.less(&1, &2));
        assert!(!Less.less(&2, &2));
        assert!(!Less.less(&3, &2));
    }

    #[test]
    fn greater_reverses_ord() {
        assert!(Greater.less(&3, &2));
        assert!(!Greater.less(&2, &3));
    }

    #[test]
    fn equivalence_is_not_equality() {
        let case_insensitive =
            ByFn(|a: &&str, b: &&str| a.to_ascii_lowercase() < b.to_ascii_lowercase());
        assert!(case_insensitive.equivalent(&"Hello", &"hELLO"));
        assert!(!case_insensitive.equivalent(&"Hello", &"World"));
    }

    #[test]
    fn compare_is_consistent_with_less() {
        assert_eq!(Less.compare(&1, &2), Ordering::Less);
        assert_eq!(Less.compare(&2, &1), Ordering::Greater);
        assert_eq!(Less.compare(&2, &2), Ordering::Equal);
    }

    #[test]
    fn unsized_keys_are_comparable() {
        assert!(Less.less("abc", "abd"));
        assert!(Compare::<str>::equivalent(&Less, "x", "x"));
    }

    #[test]
    fn reference_forwards() {
        let c = &Greater;
        assert!(c.less(&5, &4));
    }
}
