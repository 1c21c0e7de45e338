//! Sorted flat set for tidyset.
//!
//! [`ArraySet`] keeps its elements in one contiguous block, sorted by a
//! comparator and free of equivalent duplicates. Lookups are branchless
//! binary searches over the block; insertion shifts the tail in place or,
//! when the block is full, grows into a fresh block obtained through the
//! container's allocator.
//!
//! # Failure model
//!
//! Every operation that may allocate returns a [`SetError`] on failure and
//! leaves the set exactly as it was. Element relocation is a bitwise move
//! and cannot fail. The only user code that can fail part-way through a
//! rebuild is `Clone::clone`; a rebuild guard destroys and frees the
//! partially built block while the panic unwinds.
//!
//! # Unsafe code
//!
//! The crate denies `unsafe` by default. The set, its owning iterator and
//! the rebuild guard manage initialized prefixes of raw blocks and opt back
//! in locally, with a `// SAFETY:` comment on every block.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array_set;
mod guard;
pub mod iter;

pub use array_set::ArraySet;
pub use iter::{IntoIter, Iter};
pub use tidyset_core::SetError;
