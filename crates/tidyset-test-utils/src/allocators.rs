//! Allocators for exercising failure and leak paths.
//!
//! - [`FailingAllocator`]: serves N requests, then refuses every request
//!   until disarmed.
//! - [`CountingAllocator`]: keeps a ledger of live blocks and panics on
//!   frees it cannot match.
//!
//! Both wrap another allocator (by default [`Global`]) and share their state
//! between clones, so the clone a container makes of its allocator reports
//! into the same counters the test holds.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;

use indexmap::IndexMap;
use tidyset_alloc::{AllocError, Allocator, Global};

struct FailState {
    /// Requests still allowed to succeed; `None` never fails.
    budget: Cell<Option<usize>>,
    served: Cell<usize>,
    refused: Cell<usize>,
}

/// Allocator that fails deterministically after a number of successes.
#[derive(Clone)]
pub struct FailingAllocator<A: Allocator = Global> {
    inner: A,
    state: Rc<FailState>,
}

impl FailingAllocator {
    /// A disarmed allocator over [`Global`].
    pub fn new() -> Self {
        Self::wrap(Global)
    }

    /// An allocator over [`Global`] that serves `n` requests, then fails.
    pub fn failing_after(n: usize) -> Self {
        let alloc = Self::new();
        alloc.fail_after(n);
        alloc
    }
}

impl Default for FailingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> FailingAllocator<A> {
    /// A disarmed allocator forwarding to `inner`.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            state: Rc::new(FailState {
                budget: Cell::new(None),
                served: Cell::new(0),
                refused: Cell::new(0),
            }),
        }
    }

    /// Let the next `n` requests through, then refuse all later ones.
    pub fn fail_after(&self, n: usize) {
        self.state.budget.set(Some(n));
    }

    /// Stop refusing requests.
    pub fn disarm(&self) {
        self.state.budget.set(None);
    }

    /// Requests served so far.
    pub fn served(&self) -> usize {
        self.state.served.get()
    }

    /// Requests refused so far.
    pub fn refused(&self) -> usize {
        self.state.refused.get()
    }
}

impl<A: Allocator> PartialEq for FailingAllocator<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state) && self.inner == other.inner
    }
}

impl<A: Allocator> fmt::Debug for FailingAllocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailingAllocator")
            .field("budget", &self.state.budget.get())
            .field("served", &self.served())
            .field("refused", &self.refused())
            .finish()
    }
}

// SAFETY: every block served comes unchanged from `inner`, and equal
// values share the same `inner` (checked by `PartialEq`).
unsafe impl<A: Allocator> Allocator for FailingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        match self.state.budget.get() {
            Some(0) => {
                self.state.refused.set(self.state.refused.get() + 1);
                return Err(AllocError::OutOfMemory {
                    requested: layout.size(),
                    available: 0,
                });
            }
            Some(n) => self.state.budget.set(Some(n - 1)),
            None => {}
        }
        let ptr = self.inner.allocate(layout)?;
        self.state.served.set(self.state.served.get() + 1);
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded from the caller; every block came from `inner`.
        unsafe { self.inner.deallocate(ptr, layout) }
    }

    fn max_size(&self) -> usize {
        self.inner.max_size()
    }
}

struct Ledger {
    /// Live blocks by address.
    live: IndexMap<usize, Layout>,
    allocations: usize,
    deallocations: usize,
    /// Largest request allowed, in bytes.
    max_size: usize,
}

/// Allocator that records every live block.
///
/// Freeing a block it never handed out, or freeing with a different layout,
/// panics immediately.
#[derive(Clone)]
pub struct CountingAllocator<A: Allocator = Global> {
    inner: A,
    ledger: Rc<RefCell<Ledger>>,
}

impl CountingAllocator {
    /// A counting allocator over [`Global`].
    pub fn new() -> Self {
        Self::wrap(Global)
    }

    /// A counting allocator over [`Global`] that refuses requests larger
    /// than `bytes`, and reports `bytes` as its `max_size()`.
    pub fn with_max_size(bytes: usize) -> Self {
        let alloc = Self::new();
        alloc.ledger.borrow_mut().max_size = bytes;
        alloc
    }
}

impl Default for CountingAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> CountingAllocator<A> {
    /// A counting allocator forwarding to `inner`.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            ledger: Rc::new(RefCell::new(Ledger {
                live: IndexMap::new(),
                allocations: 0,
                deallocations: 0,
                max_size: usize::MAX,
            })),
        }
    }

    /// Blocks handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.ledger.borrow().live.len()
    }

    /// Bytes in live blocks.
    pub fn live_bytes(&self) -> usize {
        self.ledger.borrow().live.values().map(Layout::size).sum()
    }

    /// Blocks handed out over the allocator's lifetime.
    pub fn allocations(&self) -> usize {
        self.ledger.borrow().allocations
    }

    /// Blocks returned over the allocator's lifetime.
    pub fn deallocations(&self) -> usize {
        self.ledger.borrow().deallocations
    }

    /// Panic with the list of live blocks if any remain.
    #[track_caller]
    pub fn assert_no_leaks(&self) {
        let ledger = self.ledger.borrow();
        assert!(
            ledger.live.is_empty(),
            "{} block(s) leaked: {:?}",
            ledger.live.len(),
            ledger.live.values().collect::<Vec<_>>(),
        );
    }
}

impl<A: Allocator> PartialEq for CountingAllocator<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.ledger, &other.ledger) && self.inner == other.inner
    }
}

impl<A: Allocator> fmt::Debug for CountingAllocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingAllocator")
            .field("live_blocks", &self.live_blocks())
            .field("allocations", &self.allocations())
            .field("deallocations", &self.deallocations())
            .finish()
    }
}

// SAFETY: every block served comes unchanged from `inner`, and equal
// values share the same `inner` (checked by `PartialEq`). The size limit
// only refuses requests, and `max_size` reports it.
unsafe impl<A: Allocator> Allocator for CountingAllocator<A> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let max = self.max_size();
        if layout.size() > max {
            return Err(AllocError::OutOfMemory {
                requested: layout.size(),
                available: max,
            });
        }
        let ptr = self.inner.allocate(layout)?;
        if layout.size() != 0 {
            let mut ledger = self.ledger.borrow_mut();
            let previous = ledger.live.insert(ptr.as_ptr() as usize, layout);
            assert!(previous.is_none(), "block {ptr:p} handed out twice");
            ledger.allocations += 1;
        }
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            let mut ledger = self.ledger.borrow_mut();
            match ledger.live.swap_remove(&(ptr.as_ptr() as usize)) {
                Some(recorded) => assert_eq!(
                    recorded, layout,
                    "block {ptr:p} freed with a different layout"
                ),
                None => panic!("block {ptr:p} freed but not live"),
            }
            ledger.deallocations += 1;
        }
        // SAFETY: the ledger confirmed the block is live and came from
        // `inner` with this layout.
        unsafe { self.inner.deallocate(ptr, layout) }
    }

    fn max_size(&self) -> usize {
        self.inner.max_size().min(self.ledger.borrow().max_size)
    }
}
