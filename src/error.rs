use std::alloc::Layout;

use thiserror::Error;

/// Failure to obtain storage for a requested capacity.
///
/// When either variant is returned the array is exactly as it was before
/// the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The requested slot count does not fit in a valid `Layout`.
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The global allocator returned null for `layout`.
    #[error("allocation of {} bytes failed", layout.size())]
    AllocFailed { layout: Layout },
}

/// Returned by checked element access when `index >= len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of range for array of length {len}")]
pub struct OutOfRange {
    pub index: usize,
    pub len: usize,
}
