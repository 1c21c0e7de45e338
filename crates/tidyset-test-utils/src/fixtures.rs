//! Element types that observe their own lifecycle.
//!
//! - [`DropCounter`]: ordered by key, records every clone and drop in a
//!   shared [`DropLedger`].
//! - [`PanicOnClone`]: a `DropCounter` whose `clone` panics once a shared
//!   [`CloneFuse`] burns down.
//!
//! Leak tests build values through a ledger, run operations, drop the
//! container and check [`DropLedger::alive`] is zero.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct LedgerState {
    created: Cell<usize>,
    dropped: Cell<usize>,
}

/// Shared counter of values created and dropped.
#[derive(Clone, Default)]
pub struct DropLedger {
    state: Rc<LedgerState>,
}

impl DropLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new tracked value with `key`.
    pub fn track(&self, key: i32) -> DropCounter {
        self.state.created.set(self.state.created.get() + 1);
        DropCounter {
            key,
            ledger: self.clone(),
        }
    }

    /// Values created, including clones.
    pub fn created(&self) -> usize {
        self.state.created.get()
    }

    /// Values dropped.
    pub fn dropped(&self) -> usize {
        self.state.dropped.get()
    }

    /// Values created and not yet dropped.
    pub fn alive(&self) -> usize {
        self.created() - self.dropped()
    }
}

impl fmt::Debug for DropLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropLedger")
            .field("created", &self.created())
            .field("dropped", &self.dropped())
            .finish()
    }
}

/// A keyed value that reports clones and drops to its ledger.
///
/// Equality and ordering look at the key only.
pub struct DropCounter {
    key: i32,
    ledger: DropLedger,
}

impl DropCounter {
    pub fn key(&self) -> i32 {
        self.key
    }
}

impl Clone for DropCounter {
    fn clone(&self) -> Self {
        self.ledger.track(self.key)
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        let state = &self.ledger.state;
        state.dropped.set(state.dropped.get() + 1);
    }
}

impl PartialEq for DropCounter {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DropCounter {}

impl PartialOrd for DropCounter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DropCounter {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Debug for DropCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DropCounter({})", self.key)
    }
}

/// Shared countdown of clones allowed before [`PanicOnClone`] panics.
#[derive(Clone, Default)]
pub struct CloneFuse {
    remaining: Rc<Cell<Option<usize>>>,
}

impl CloneFuse {
    /// A disarmed fuse: clones never panic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow `n` more clones; the next one panics.
    pub fn arm(&self, n: usize) {
        self.remaining.set(Some(n));
    }

    pub fn disarm(&self) {
        self.remaining.set(None);
    }

    fn burn(&self) {
        match self.remaining.get() {
            Some(0) => panic!("PanicOnClone: clone fuse blown"),
            Some(n) => self.remaining.set(Some(n - 1)),
            None => {}
        }
    }
}

/// A tracked value whose `clone` panics when its fuse runs out.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
pub struct PanicOnClone {
    value: DropCounter,
    fuse: FuseField,
}

/// Wrapper so the fuse does not take part in comparisons.
struct FuseField(CloneFuse);

impl PartialEq for FuseField {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for FuseField {}

impl PartialOrd for FuseField {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FuseField {
    fn cmp(&self, _: &Self) -> Ordering {
        Ordering::Equal
    }
}

impl PanicOnClone {
    pub fn new(ledger: &DropLedger, fuse: &CloneFuse, key: i32) -> Self {
        Self {
            value: ledger.track(key),
            fuse: FuseField(fuse.clone()),
        }
    }

    pub fn key(&self) -> i32 {
        self.value.key()
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        self.fuse.0.burn();
        Self {
            value: self.value.clone(),
            fuse: FuseField(self.fuse.0.clone()),
        }
    }
}

impl fmt::Debug for PanicOnClone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PanicOnClone({})", self.key())
    }
}
