//! Allocation counters for arenas.
//!
//! [`AllocMetrics`] is a plain snapshot of what an allocator has handed out
//! and taken back, for telemetry, leak checks and capacity planning.

/// Counters collected by an allocator over its lifetime.
///
/// Byte figures count requested sizes, not alignment padding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocMetrics {
    /// Successful non-empty allocations.
    pub allocations: u64,
    /// Blocks returned through `deallocate`.
    pub deallocations: u64,
    /// Requests refused with `OutOfMemory`.
    pub failed_allocations: u64,
    /// Bytes currently handed out and not yet returned.
    pub bytes_in_use: usize,
    /// Highest value `bytes_in_use` has reached.
    pub peak_bytes: usize,
    /// Total bytes the allocator can serve.
    pub capacity_bytes: usize,
}

impl AllocMetrics {
    /// Blocks handed out and not yet returned.
    pub fn live_allocations(&self) -> u64 {
        self.allocations - self.deallocations
    }

    pub(crate) fn record_alloc(&mut self, bytes: usize) {
        self.allocations += 1;
        self.bytes_in_use += bytes;
        self.peak_bytes = self.peak_bytes.max(self.bytes_in_use);
    }

    pub(crate) fn record_dealloc(&mut self, bytes: usize) {
        self.deallocations += 1;
        self.bytes_in_use -= bytes;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = AllocMetrics::default();
        assert_eq!(m.allocations, 0);
        assert_eq!(m.deallocations, 0);
        assert_eq!(m.failed_allocations, 0);
        assert_eq!(m.bytes_in_use, 0);
        assert_eq!(m.live_allocations(), 0);
    }

    #[test]
    fn peak_survives_deallocation() {
        let mut m = AllocMetrics::default();
        m.record_alloc(100);
        m.record_alloc(50);
        m.record_dealloc(100);
        assert_eq!(m.bytes_in_use, 50);
        assert_eq!(m.peak_bytes, 150);
        assert_eq!(m.live_allocations(), 1);
    }
}
