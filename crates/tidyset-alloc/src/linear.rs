//! Bump-allocated linear arena.
//!
//! A [`LinearAllocator`] owns one pre-allocated block and serves requests by
//! advancing a cursor through it. Individual blocks are never reused:
//! `deallocate` only updates bookkeeping, and the cursor rewinds to the
//! start once every outstanding block has been returned.
//!
//! Clones share the same arena, compare equal, and can therefore release
//! each other's blocks. This is what lets several containers draw from one
//! arena and still pass the compatibility rules of
//! [`Allocator`](crate::Allocator).

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::Cell;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use tidyset_core::AllocError;

use crate::allocator::Allocator;
use crate::config::LinearConfig;
use crate::metrics::AllocMetrics;
use crate::raw;

/// The shared backing block.
struct Arena {
    /// Start of the backing block (dangling for zero capacity).
    base: NonNull<u8>,
    /// Layout the block was obtained with.
    layout: Layout,
    /// Bump pointer: offset of the first free byte.
    cursor: Cell<usize>,
    /// Blocks handed out and not yet returned.
    live: Cell<usize>,
    metrics: Cell<AllocMetrics>,
}

impl Arena {
    fn update_metrics(&self, f: impl FnOnce(&mut AllocMetrics)) {
        let mut m = self.metrics.get();
        f(&mut m);
        self.metrics.set(m);
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: `base` came from `raw::global_alloc(layout)` (or is the
        // zero-sized dangling block, which `global_dealloc` ignores) and the
        // last clone is going away, so nothing can reach it afterwards.
        unsafe { raw::global_dealloc(self.base, self.layout) }
    }
}

/// A bump allocator over a single fixed-size block.
///
/// Cheap to clone; all clones draw from the same block. Not `Send`: an
/// arena belongs to one thread, like the containers that use it.
///
/// ```
/// use std::alloc::Layout;
/// use tidyset_alloc::{Allocator, LinearAllocator};
///
/// let arena = LinearAllocator::new(1024)?;
/// let a = arena.allocate(Layout::array::<u32>(32).unwrap())?;
/// let b = arena.allocate(Layout::array::<u32>(32).unwrap())?;
/// assert_eq!(a.as_ptr() as usize + 128, b.as_ptr() as usize);
/// assert_eq!(arena.used(), 256);
/// # Ok::<(), tidyset_alloc::AllocError>(())
/// ```
#[derive(Clone)]
pub struct LinearAllocator {
    arena: Rc<Arena>,
}

impl LinearAllocator {
    /// Create an arena with a backing block of `capacity_bytes`.
    ///
    /// Uses the default block alignment.
    pub fn new(capacity_bytes: usize) -> Result<Self, AllocError> {
        Self::with_config(LinearConfig::new(capacity_bytes))
    }

    /// Create an arena from a validated config.
    pub fn with_config(config: LinearConfig) -> Result<Self, AllocError> {
        let layout = config.layout()?;
        let base = raw::global_alloc(layout).ok_or(AllocError::OutOfMemory {
            requested: layout.size(),
            available: usize::MAX,
        })?;
        Ok(Self::from_block(base, layout))
    }

    fn from_block(base: NonNull<u8>, layout: Layout) -> Self {
        let metrics = AllocMetrics {
            capacity_bytes: layout.size(),
            ..AllocMetrics::default()
        };
        Self {
            arena: Rc::new(Arena {
                base,
                layout,
                cursor: Cell::new(0),
                live: Cell::new(0),
                metrics: Cell::new(metrics),
            }),
        }
    }

    /// Total capacity of the backing block in bytes.
    pub fn capacity(&self) -> usize {
        self.arena.layout.size()
    }

    /// Bytes consumed so far, including alignment padding.
    pub fn used(&self) -> usize {
        self.arena.cursor.get()
    }

    /// Bytes still available past the cursor.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Blocks handed out and not yet returned.
    pub fn live_allocations(&self) -> usize {
        self.arena.live.get()
    }

    /// Snapshot of the arena's counters.
    pub fn metrics(&self) -> AllocMetrics {
        self.arena.metrics.get()
    }

    /// Whether `ptr` points into this arena's backing block.
    pub fn owns(&self, ptr: *const u8) -> bool {
        let start = self.arena.base.as_ptr() as usize;
        let addr = ptr as usize;
        addr >= start && addr < start + self.capacity()
    }
}

impl Default for LinearAllocator {
    /// An arena with no backing block: `max_size() == 0` and every
    /// non-empty request fails.
    fn default() -> Self {
        let layout = Layout::new::<()>();
        Self::from_block(raw::dangling(layout.align()), layout)
    }
}

impl PartialEq for LinearAllocator {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }
}

impl Eq for LinearAllocator {}

impl fmt::Debug for LinearAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearAllocator")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("live", &self.live_allocations())
            .finish()
    }
}

// SAFETY: each block is a fresh, aligned sub-range past the cursor inside
// the backing block, which outlives every clone sharing the `Rc`. The cursor
// only rewinds once no block is live, and clones compare equal exactly when
// they share the arena.
unsafe impl Allocator for LinearAllocator {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(raw::dangling(layout.align()));
        }
        let arena = &*self.arena;
        let cursor = arena.cursor.get();
        let capacity = arena.layout.size();
        let base = arena.base.as_ptr() as usize;

        // Align the absolute address so requests stricter than the block's
        // own alignment are still honoured.
        let fits = (base + cursor)
            .checked_next_multiple_of(layout.align())
            .map(|aligned| aligned - base)
            .and_then(|start| Some((start, start.checked_add(layout.size())?)))
            .filter(|&(_, end)| end <= capacity);

        match fits {
            Some((start, end)) => {
                arena.cursor.set(end);
                arena.live.set(arena.live.get() + 1);
                arena.update_metrics(|m| m.record_alloc(layout.size()));
                // SAFETY: `start < end <= capacity`, so the offset stays inside
                // the backing block and the result is non-null.
                Ok(unsafe { NonNull::new_unchecked(arena.base.as_ptr().add(start)) })
            }
            None => {
                arena.update_metrics(AllocMetrics::record_failure);
                Err(AllocError::OutOfMemory {
                    requested: layout.size(),
                    available: capacity - cursor,
                })
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        debug_assert!(self.owns(ptr.as_ptr()), "block not from this arena");
        let arena = &*self.arena;
        let live = arena.live.get() - 1;
        arena.live.set(live);
        arena.update_metrics(|m| m.record_dealloc(layout.size()));
        if live == 0 {
            arena.cursor.set(0);
        }
    }

    fn max_size(&self) -> usize {
        self.capacity()
    }
}
