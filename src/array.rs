use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::{self, Deref, DerefMut};
use std::ptr;
use std::slice;

use log::{debug, trace};

use crate::error::{AllocError, OutOfRange};
use crate::growth::{Doubling, GrowthPolicy};
use crate::raw::{RawBuffer, handle_alloc_failure};

/// A contiguous, growable array that owns its heap storage.
///
/// Slots `[0, len)` hold live values; slots `[len, capacity)` are
/// uninitialised. The array is the single owner of its buffer. Moving it
/// hands the buffer over wholesale, cloning allocates an independent one.
///
/// Every operation that changes the capacity moves the elements to a new
/// block. The borrow checker ends all outstanding references before such an
/// operation can run, so code that needs to keep a position across one must
/// keep an index.
///
/// `P` decides how much to grow when an insertion finds the array full; see
/// [`GrowthPolicy`].
pub struct DynamicArray<T, P = Doubling> {
    buf: RawBuffer<T>,
    len: usize,
    _policy: PhantomData<fn() -> P>,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array. Does not allocate.
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Creates an empty array with exactly `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in_policy(capacity)
    }

    /// Creates an array holding a clone of each element of `items`, with
    /// capacity equal to `items.len()`.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        let mut out = Self::with_capacity(items.len());
        out.extend_from_slice(items);
        out
    }

    /// Creates an array of `n` clones of `value`.
    pub fn from_elem(value: T, n: usize) -> Self
    where
        T: Clone,
    {
        let mut out = Self::with_capacity(n);
        out.resize_fill(n, value);
        out
    }
}

impl<T, P: GrowthPolicy> DynamicArray<T, P> {
    /// Creates an empty array that grows according to `P`.
    pub const fn new_in_policy() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Creates an empty array with exactly `capacity` slots that grows
    /// according to `P`.
    pub fn with_capacity_in_policy(capacity: usize) -> Self {
        Self {
            buf: RawBuffer::allocate(capacity),
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of allocated slots. Always `>= len()`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The largest length this array could ever reach.
    pub fn max_size(&self) -> usize {
        if RawBuffer::<T>::IS_ZST {
            usize::MAX
        } else {
            isize::MAX as usize / mem::size_of::<T>()
        }
    }

    /// Pointer to the first slot. Dangling (non-null, not dereferenceable)
    /// while nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialised and the pointer is aligned.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Checked element access.
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len;
        self.as_slice().get(index).ok_or(OutOfRange { index, len })
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len;
        self.as_mut_slice().get_mut(index).ok_or(OutOfRange { index, len })
    }

    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Ensures the array has room for at least `min_capacity` elements in
    /// total. Allocates exactly `min_capacity` slots when it has to grow.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow; aborts through
    /// [`std::alloc::handle_alloc_error`] if the allocator fails.
    pub fn reserve(&mut self, min_capacity: usize) {
        if let Err(err) = self.try_reserve(min_capacity) {
            handle_alloc_failure(err);
        }
    }

    /// Fallible [`reserve`](Self::reserve). On error the array is untouched.
    pub fn try_reserve(&mut self, min_capacity: usize) -> Result<(), AllocError> {
        if min_capacity <= self.capacity() {
            return Ok(());
        }
        self.buf.try_resize(min_capacity)
    }

    /// Reallocates so that `capacity() == len()`. An empty array gives its
    /// block back entirely.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len && !RawBuffer::<T>::IS_ZST {
            debug!("shrinking from {} to {} slots", self.capacity(), self.len);
            if let Err(err) = self.buf.try_resize(self.len) {
                handle_alloc_failure(err);
            }
        }
    }

    /// Grows by the policy so that `additional` more elements fit.
    fn try_grow_amortized(&mut self, additional: usize) -> Result<(), AllocError> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(AllocError::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        self.buf.try_resize(self.next_capacity(required))
    }

    fn grow_amortized(&mut self, additional: usize) {
        if let Err(err) = self.try_grow_amortized(additional) {
            handle_alloc_failure(err);
        }
    }

    fn next_capacity(&self, required: usize) -> usize {
        P::grow(self.capacity(), required).max(required)
    }

    /// Appends `value`.
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity() {
            self.grow_amortized(1);
        }
        // SAFETY: `len < capacity`, so the slot is allocated and vacant.
        unsafe { ptr::write(self.buf.ptr().add(self.len), value) };
        self.len += 1;
    }

    /// Appends the value produced by `make`, writing it straight into its
    /// slot.
    ///
    /// If the array is full, `make` runs against the new block before any
    /// element is moved. Should it panic, the new block is released and the
    /// array keeps its length and capacity.
    pub fn emplace_back<F>(&mut self, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let index = self.len;
        self.emplace_at(index, make)
    }

    /// Inserts `value` at `index`, shifting `[index, len)` one slot towards
    /// the tail.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        assert!(index <= self.len, "Index out of bounds");
        if self.len == self.capacity() {
            self.grow_amortized(1);
        }

        // SAFETY: `index <= len < capacity`. The shifted range stays inside
        // the allocation and `ptr::copy` handles the overlap.
        unsafe {
            let p = self.buf.ptr().add(index);
            ptr::copy(p, p.add(1), self.len - index);
            ptr::write(p, value);
            self.len += 1;
            &mut *p
        }
    }

    /// Inserts the value produced by `make` at `index`. Same panic guarantee
    /// as [`emplace_back`](Self::emplace_back).
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace<F>(&mut self, index: usize, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        assert!(index <= self.len, "Index out of bounds");
        self.emplace_at(index, make)
    }

    fn emplace_at<F>(&mut self, index: usize, make: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        if len == self.capacity() {
            let required = len
                .checked_add(1)
                .unwrap_or_else(|| handle_alloc_failure(AllocError::CapacityOverflow));
            let fresh = RawBuffer::<T>::allocate(self.next_capacity(required));
            // SAFETY: `fresh` has more than `len` slots. The new element is
            // written first, so a panic in `make` only drops `fresh`. The old
            // elements are then moved bitwise around the gap.
            unsafe {
                let dst = fresh.ptr();
                ptr::write(dst.add(index), make());
                ptr::copy_nonoverlapping(self.buf.ptr(), dst, index);
                ptr::copy_nonoverlapping(self.buf.ptr().add(index), dst.add(index + 1), len - index);
            }
            trace!("emplaced into a fresh block of {} slots", fresh.capacity());
            // The old block holds only moved-from bytes now.
            self.buf = fresh;
        } else {
            let value = make();
            // SAFETY: `index <= len < capacity`.
            unsafe {
                let p = self.buf.ptr().add(index);
                ptr::copy(p, p.add(1), len - index);
                ptr::write(p, value);
            }
        }
        self.len = len + 1;
        // SAFETY: the slot was just initialised.
        unsafe { &mut *self.buf.ptr().add(index) }
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            // SAFETY: slot `len` was live and is now outside the live range.
            unsafe { Some(ptr::read(self.buf.ptr().add(self.len))) }
        }
    }

    /// Removes and returns the element at `index`, shifting the tail down.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len, "Index out of bounds");
        // SAFETY: `index < len`; the tail copy stays inside the live range.
        unsafe {
            self.len -= 1;
            let p = self.buf.ptr().add(index);
            let result = ptr::read(p);
            ptr::copy(p.add(1), p, self.len - index);
            result
        }
    }

    /// Drops the element at `index` and closes the gap. Returns the index now
    /// holding the element that followed it, equal to `len()` if the last
    /// element was erased.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Drops every element in `range` and moves the tail down to close the
    /// gap. Returns the index now holding the first element after the range.
    /// An empty range is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or ends past `len`.
    pub fn erase_range<R>(&mut self, range: R) -> usize
    where
        R: ops::RangeBounds<usize>,
    {
        let ops::Range { start, end } =
            range_from_bounds(range, self.len).unwrap_or_else(|| panic!("Index out of bounds"));
        if start == end {
            return start;
        }

        let tail = self.len - end;
        // Shorten first: a panicking destructor then leaks the tail instead
        // of exposing dropped slots.
        self.len = start;
        // SAFETY: `[start, end)` were live and are no longer reachable; the
        // tail `[end, end + tail)` is live and moves into the gap.
        unsafe {
            let base = self.buf.ptr();
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.add(start), end - start));
            ptr::copy(base.add(end), base.add(start), tail);
        }
        self.len = start + tail;
        start
    }

    /// Drops every element past `new_len`. No-op if `new_len >= len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let old_len = self.len;
        self.len = new_len;
        // SAFETY: `[new_len, old_len)` were live and are no longer reachable.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.ptr().add(new_len),
                old_len - new_len,
            ));
        }
    }

    /// Drops every element. The capacity is kept.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes to `new_len`, filling new slots with values from `make`.
    /// Growth reserves exactly `new_len` slots.
    pub fn resize_with<F>(&mut self, new_len: usize, mut make: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len < new_len {
            // SAFETY: `len < new_len <= capacity`. `len` advances one slot at
            // a time so a panic in `make` leaves only live elements counted.
            unsafe { ptr::write(self.buf.ptr().add(self.len), make()) };
            self.len += 1;
        }
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes to `new_len`, filling new slots with clones of `value`.
    pub fn resize_fill(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        self.resize_with(new_len, || value.clone());
    }

    /// Appends a clone of every element of `items`.
    pub fn extend_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.grow_amortized(items.len());
        for item in items {
            // SAFETY: room for all of `items` was reserved above.
            unsafe { ptr::write(self.buf.ptr().add(self.len), item.clone()) };
            self.len += 1;
        }
    }

    /// Replaces the contents with `n` clones of `value`.
    pub fn assign(&mut self, n: usize, value: T)
    where
        T: Clone,
    {
        self.clear();
        self.resize_fill(n, value);
    }

    /// Replaces the contents with clones of `items`.
    pub fn assign_from_slice(&mut self, items: &[T])
    where
        T: Clone,
    {
        self.clear();
        self.reserve(items.len());
        self.extend_from_slice(items);
    }

    /// Replaces the contents with the items of `iter`.
    pub fn assign_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.clear();
        self.extend(iter);
    }

    /// Moves the contents out, leaving `self` empty and unallocated.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Hands the storage and live count to an owning iterator.
    pub(crate) fn into_raw_parts(mut self) -> (RawBuffer<T>, usize) {
        let len = mem::replace(&mut self.len, 0);
        let buf = mem::replace(&mut self.buf, RawBuffer::new());
        (buf, len)
    }
}

fn range_from_bounds<R>(range: R, len: usize) -> Option<ops::Range<usize>>
where
    R: ops::RangeBounds<usize>,
{
    let start = match range.start_bound() {
        ops::Bound::Included(&start) => start,
        ops::Bound::Excluded(start) => start.checked_add(1)?,
        ops::Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        ops::Bound::Included(end) => end.checked_add(1)?,
        ops::Bound::Excluded(&end) => end,
        ops::Bound::Unbounded => len,
    };
    (start <= end && end <= len).then_some(start..end)
}

impl<T, P> Drop for DynamicArray<T, P> {
    fn drop(&mut self) {
        // SAFETY: `[0, len)` are live. The buffer releases itself afterwards.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr(), self.len));
        }
    }
}

impl<T, P: GrowthPolicy> Default for DynamicArray<T, P> {
    fn default() -> Self {
        Self::new_in_policy()
    }
}

impl<T: Clone, P: GrowthPolicy> Clone for DynamicArray<T, P> {
    /// Allocates exactly `self.len()` slots.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity_in_policy(self.len);
        out.extend_from_slice(self);
        out
    }

    /// Builds the copy completely before releasing the old contents.
    fn clone_from(&mut self, source: &Self) {
        let fresh = source.clone();
        *self = fresh;
    }
}

impl<T, P: GrowthPolicy> Deref for DynamicArray<T, P> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, P: GrowthPolicy> DerefMut for DynamicArray<T, P> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, P: GrowthPolicy> AsRef<[T]> for DynamicArray<T, P> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, P: GrowthPolicy> AsMut<[T]> for DynamicArray<T, P> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, P: GrowthPolicy> Borrow<[T]> for DynamicArray<T, P> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, P: GrowthPolicy> BorrowMut<[T]> for DynamicArray<T, P> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: fmt::Debug, P: GrowthPolicy> fmt::Debug for DynamicArray<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, P: GrowthPolicy> Extend<T> for DynamicArray<T, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.grow_amortized(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

impl<'a, T: Copy + 'a, P: GrowthPolicy> Extend<&'a T> for DynamicArray<T, P> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, P: GrowthPolicy> FromIterator<T> for DynamicArray<T, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut out = Self::new_in_policy();
        out.extend(iter);
        out
    }
}

impl<T, P: GrowthPolicy, const N: usize> From<[T; N]> for DynamicArray<T, P> {
    /// Capacity equals `N`.
    fn from(items: [T; N]) -> Self {
        let mut out = Self::with_capacity_in_policy(N);
        for item in items {
            out.push(item);
        }
        out
    }
}

impl<T: Clone, P: GrowthPolicy> From<&[T]> for DynamicArray<T, P> {
    fn from(items: &[T]) -> Self {
        let mut out = Self::with_capacity_in_policy(items.len());
        out.extend_from_slice(items);
        out
    }
}

impl<T, P: GrowthPolicy> From<Vec<T>> for DynamicArray<T, P> {
    fn from(items: Vec<T>) -> Self {
        let mut out = Self::with_capacity_in_policy(items.len());
        out.extend(items);
        out
    }
}

impl<T, U, P, Q> PartialEq<DynamicArray<U, Q>> for DynamicArray<T, P>
where
    T: PartialEq<U>,
    P: GrowthPolicy,
    Q: GrowthPolicy,
{
    fn eq(&self, other: &DynamicArray<U, Q>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U, P: GrowthPolicy, const N: usize> PartialEq<[U; N]> for DynamicArray<T, P> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T: PartialEq<U>, U, P: GrowthPolicy> PartialEq<[U]> for DynamicArray<T, P> {
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq<U>, U, P: GrowthPolicy> PartialEq<&[U]> for DynamicArray<T, P> {
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, P: GrowthPolicy> PartialEq<Vec<U>> for DynamicArray<T, P> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, P: GrowthPolicy> Eq for DynamicArray<T, P> {}

/// Lexicographic: a strict prefix orders before the longer array.
impl<T: PartialOrd, P: GrowthPolicy> PartialOrd for DynamicArray<T, P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord, P: GrowthPolicy> Ord for DynamicArray<T, P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash, P: GrowthPolicy> Hash for DynamicArray<T, P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}
