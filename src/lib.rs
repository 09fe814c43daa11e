//! A contiguous, growable array with explicit storage management.
//!
//! [`DynamicArray`] keeps storage (a block of raw slots) separate from element
//! lifetime (which slots hold live values). The block is only ever owned by
//! one array; it is released on every exit path, including unwinding.
//!
//! ```
//! use dynarray::{dynarray, DynamicArray};
//!
//! let mut v = dynarray![1, 2, 3];
//! v.insert(1, 9);
//! v.erase(0);
//! v.push(7);
//! v.pop();
//! assert_eq!(v, [9, 2, 3]);
//!
//! let moved = v.take();
//! assert!(v.is_empty());
//! assert_eq!(v.capacity(), 0);
//! assert_eq!(moved.at(0), Ok(&9));
//! # let _: DynamicArray<i32> = moved;
//! ```

mod array;
pub mod error;
pub mod growth;
mod iter;
mod raw;

pub use array::DynamicArray;
pub use error::{AllocError, OutOfRange};
pub use growth::{Doubling, GrowthPolicy, OneAndAHalf};
pub use iter::IntoIter;

/// Builds a [`DynamicArray`] from a literal sequence, sized exactly to it.
///
/// ```
/// use dynarray::dynarray;
///
/// let a = dynarray![5, 6, 7];
/// assert_eq!(a.capacity(), 3);
///
/// let zeros = dynarray![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! dynarray {
    () => {
        $crate::DynamicArray::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::DynamicArray::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        <$crate::DynamicArray<_>>::from([$($x),+])
    };
}

#[cfg(test)]
mod tests;
