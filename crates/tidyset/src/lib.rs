//! tidyset: sorted flat sets over allocator-aware contiguous storage.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all tidyset sub-crates. For most users, adding `tidyset` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use tidyset::prelude::*;
//!
//! // A set drawing its storage from a 4KB bump arena.
//! let arena = LinearAllocator::new(4096)?;
//! let mut set = ArraySet::new_in(arena.clone());
//! for v in [5, 3, 5, 1, 4] {
//!     set.insert(v)?;
//! }
//! assert_eq!(set.as_slice(), &[1, 3, 4, 5]);
//! assert!(set.contains(&3));
//! assert_eq!(arena.live_allocations(), 1);
//!
//! // Reverse order, with the second "b" rejected as a duplicate.
//! let words: ArraySet<&str, Greater> =
//!     ArraySet::try_from_iter_in(["b", "a", "b"], Greater, Global)?;
//! assert_eq!(words.as_slice(), &["b", "a"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tidyset-core` | Errors, comparators, search primitives |
//! | [`memory`] | `tidyset-alloc` | Allocation handles, allocators, linear arena |
//! | [`array`] | `tidyset-array` | `ArraySet` and its iterators |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Errors, comparators and search primitives (`tidyset-core`).
///
/// The range comparisons and lower-bound searches in
/// [`types::search`] work on any iterator or slice, independent of the
/// containers.
pub use tidyset_core as types;

/// Allocation handles, the allocator capability and the linear arena
/// (`tidyset-alloc`).
///
/// Implement [`memory::Allocator`] to plug custom storage into a container.
pub use tidyset_alloc as memory;

/// The sorted flat set (`tidyset-array`).
pub use tidyset_array as array;

/// Common imports for typical tidyset usage.
///
/// ```rust
/// use tidyset::prelude::*;
/// ```
pub mod prelude {
    // Container
    pub use tidyset_array::ArraySet;

    // Comparators
    pub use tidyset_core::{ByFn, Compare, Greater, Less};

    // Allocators
    pub use tidyset_alloc::{AllocMetrics, Allocator, Global, LinearAllocator, LinearConfig};

    // Errors
    pub use tidyset_core::{AllocError, SetError};
}
