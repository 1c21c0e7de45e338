//! Core types and traits for the tidyset containers.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the pieces every other crate in the workspace builds on: error types,
//! the comparator capability, and the ordering/search primitives used by
//! the sorted containers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod search;

pub use compare::{ByFn, Compare, Greater, Less};
pub use error::{AllocError, SetError};
pub use search::{
    binary_search, greater_than, greater_than_or_equal, less_than, less_than_or_equal,
    lexicographic_compare, linear_find, linear_search,
};
