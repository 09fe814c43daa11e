//! Growth policies used when an insertion finds the array full.
//!
//! A policy only proposes a capacity; the array always clamps the proposal
//! to at least the number of slots it actually needs.

/// Chooses the next capacity for a full array.
///
/// Implementations must grow multiplicatively so that a run of `n`
/// single-element insertions performs `O(log n)` reallocations.
pub trait GrowthPolicy {
    /// Returns the capacity to allocate when `current` slots are not enough
    /// to hold `required` elements.
    fn grow(current: usize, required: usize) -> usize;
}

/// Doubles the capacity, starting from a single slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Doubling;

impl GrowthPolicy for Doubling {
    #[inline]
    fn grow(current: usize, required: usize) -> usize {
        current.saturating_mul(2).max(1).max(required)
    }
}

/// Grows by half of the current capacity, starting from four slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OneAndAHalf;

impl GrowthPolicy for OneAndAHalf {
    #[inline]
    fn grow(current: usize, required: usize) -> usize {
        current.saturating_add(current / 2).max(4).max(required)
    }
}
