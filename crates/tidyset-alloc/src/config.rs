//! Linear arena configuration parameters.

use std::alloc::Layout;

use tidyset_core::AllocError;

/// Configuration for a [`LinearAllocator`](crate::LinearAllocator).
///
/// Controls the size and alignment of the single backing block.
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearConfig {
    /// Size of the backing block in bytes.
    ///
    /// Default: 65_536 (64KB). Zero is allowed and yields an arena that
    /// refuses every non-empty request.
    pub capacity_bytes: usize,

    /// Alignment of the backing block in bytes.
    ///
    /// Default: 16. Must be a non-zero power of two. Requests with a larger
    /// alignment are still served; they pay for padding at the cursor.
    pub align: usize,
}

impl LinearConfig {
    /// Default backing block size: 64KB.
    pub const DEFAULT_CAPACITY_BYTES: usize = 64 * 1024;

    /// Default backing block alignment.
    pub const DEFAULT_ALIGN: usize = 16;

    /// Create a config for a block of `capacity_bytes`.
    ///
    /// Uses the default alignment.
    pub fn new(capacity_bytes: usize) -> Self {
        Self {
            capacity_bytes,
            align: Self::DEFAULT_ALIGN,
        }
    }

    /// Same config with a different block alignment.
    pub fn with_align(mut self, align: usize) -> Self {
        self.align = align;
        self
    }

    /// Check that the values describe a representable block.
    pub fn validate(&self) -> Result<(), AllocError> {
        self.layout().map(|_| ())
    }

    /// Layout of the backing block.
    pub fn layout(&self) -> Result<Layout, AllocError> {
        if !self.align.is_power_of_two() {
            return Err(AllocError::InvalidConfig {
                reason: format!("align {} is not a power of two", self.align),
            });
        }
        Layout::from_size_align(self.capacity_bytes, self.align).map_err(|_| {
            AllocError::InvalidConfig {
                reason: format!(
                    "capacity {} bytes at align {} exceeds isize::MAX",
                    self.capacity_bytes, self.align
                ),
            }
        })
    }
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_64kb_at_16() {
        let config = LinearConfig::default();
        assert_eq!(config.capacity_bytes, 64 * 1024);
        assert_eq!(config.align, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn capacity_preserved() {
        let config = LinearConfig::new(10_000).with_align(64);
        assert_eq!(config.capacity_bytes, 10_000);
        assert_eq!(config.layout().unwrap().align(), 64);
    }

    #[test]
    fn zero_capacity_is_valid() {
        assert!(LinearConfig::new(0).validate().is_ok());
    }

    #[test]
    fn non_power_of_two_align_rejected() {
        let err = LinearConfig::new(64).with_align(24).validate().unwrap_err();
        assert!(matches!(err, AllocError::InvalidConfig { .. }));
        assert!(LinearConfig::new(64).with_align(0).validate().is_err());
    }

    #[test]
    fn oversized_block_rejected() {
        let err = LinearConfig::new(usize::MAX).validate().unwrap_err();
        assert!(matches!(err, AllocError::InvalidConfig { .. }));
    }
}
