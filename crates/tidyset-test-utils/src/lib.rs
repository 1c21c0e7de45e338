//! Test utilities for tidyset development.
//!
//! Allocators that fail on demand or keep a ledger of live blocks
//! ([`FailingAllocator`], [`CountingAllocator`]) and element types that
//! record their own drops or panic while being cloned ([`DropCounter`],
//! [`PanicOnClone`]).

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod allocators;
pub mod fixtures;

pub use allocators::{CountingAllocator, FailingAllocator};
pub use fixtures::{CloneFuse, DropCounter, DropLedger, PanicOnClone};
