//! Allocation primitives for the tidyset containers.
//!
//! Containers never talk to the process allocator directly. They own one
//! [`Allocation`] handle (a move-only `{capacity, storage}` record) and one
//! allocator instance held by an [`AllocatorAware`] base, which is the only
//! place storage is requested and returned.
//!
//! # Architecture
//!
//! ```text
//! Container
//! ├── AllocatorAware<A>  (one allocator per container)
//! │   └── A: Allocator   (Global, LinearAllocator, or user-supplied)
//! └── Allocation<T>      (capacity + raw block, freed exactly once)
//! ```
//!
//! # Unsafe code
//!
//! The crate denies `unsafe` by default. The modules that hand out raw
//! storage opt back in locally and carry a `// SAFETY:` comment on every
//! block.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod allocation;
pub mod allocator;
pub mod base;
pub mod config;
pub mod linear;
pub mod metrics;
mod raw;

// Public re-exports for the primary API surface.
pub use allocation::Allocation;
pub use allocator::{Allocator, Global};
pub use base::AllocatorAware;
pub use config::LinearConfig;
pub use linear::LinearAllocator;
pub use metrics::AllocMetrics;
pub use tidyset_core::AllocError;
