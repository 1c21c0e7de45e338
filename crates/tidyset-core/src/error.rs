//! Error types for the tidyset containers.
//!
//! Organized by subsystem: allocation (anything an allocator can refuse)
//! and set operations (everything a container method can report back to
//! its caller).

use std::error::Error;
use std::fmt;

/// Errors from an allocator when a block cannot be handed out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The allocator could not satisfy the request.
    OutOfMemory {
        /// Number of bytes requested.
        requested: usize,
        /// Bytes the allocator could still serve, or `usize::MAX` when the
        /// allocator cannot tell.
        available: usize,
    },
    /// The byte size of the request does not fit in a valid layout.
    CapacityOverflow,
    /// An allocator configuration value was rejected.
    InvalidConfig {
        /// Description of the rejected value.
        reason: String,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory {
                requested,
                available,
            } => {
                if *available == usize::MAX {
                    write!(f, "out of memory: requested {requested} bytes")
                } else {
                    write!(
                        f,
                        "out of memory: requested {requested} bytes, {available} bytes available"
                    )
                }
            }
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::InvalidConfig { reason } => write!(f, "invalid allocator config: {reason}"),
        }
    }
}

impl Error for AllocError {}

/// Errors from sorted-container operations.
///
/// Every fallible operation leaves the container exactly as it was when it
/// returns one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetError {
    /// The allocator refused to provide storage.
    OutOfMemory(AllocError),
    /// The element count would exceed `max_size()`.
    CapacityExceeded {
        /// Number of element slots requested.
        requested: usize,
        /// Largest number of elements the container can hold.
        max: usize,
    },
    /// A caller-side precondition was violated, e.g. erasing a position that
    /// does not belong to the container.
    ContractViolation {
        /// Name of the operation that rejected its arguments.
        operation: &'static str,
        /// Offending position.
        index: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory(inner) => write!(f, "allocation failed: {inner}"),
            Self::CapacityExceeded { requested, max } => {
                write!(
                    f,
                    "capacity exceeded: requested {requested} elements, max {max}"
                )
            }
            Self::ContractViolation {
                operation,
                index,
                len,
            } => {
                write!(
                    f,
                    "contract violation in {operation}: position {index} out of bounds for length {len}"
                )
            }
        }
    }
}

impl Error for SetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutOfMemory(inner) => Some(inner),
            _ => None,
        }
    }
}

impl From<AllocError> for SetError {
    fn from(e: AllocError) -> Self {
        Self::OutOfMemory(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_memory_display_includes_available_when_known() {
        let e = AllocError::OutOfMemory {
            requested: 64,
            available: 16,
        };
        assert_eq!(
            e.to_string(),
            "out of memory: requested 64 bytes, 16 bytes available"
        );
    }

    #[test]
    fn out_of_memory_display_omits_unknown_available() {
        let e = AllocError::OutOfMemory {
            requested: 64,
            available: usize::MAX,
        };
        assert_eq!(e.to_string(), "out of memory: requested 64 bytes");
    }

    #[test]
    fn set_error_wraps_alloc_error_as_source() {
        let e: SetError = AllocError::CapacityOverflow.into();
        assert_eq!(e, SetError::OutOfMemory(AllocError::CapacityOverflow));
        let source = e.source().expect("OutOfMemory has a source");
        assert_eq!(source.to_string(), "capacity overflow");
    }

    #[test]
    fn contract_violation_has_no_source() {
        let e = SetError::ContractViolation {
            operation: "erase",
            index: 3,
            len: 2,
        };
        assert!(e.source().is_none());
        assert_eq!(
            e.to_string(),
            "contract violation in erase: position 3 out of bounds for length 2"
        );
    }
}
