use super::*;
use crossbeam::scope;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Droppable(Arc<AtomicUsize>);

impl Drop for Droppable {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_basic_push_pop() {
    let mut v = DynamicArray::new();
    v.push(1);
    v.push(2);
    v.push(3);
    assert_eq!(v.len(), 3);
    assert_eq!(v[0], 1);
    assert_eq!(v[1], 2);
    assert_eq!(v[2], 3);
    assert_eq!(v.pop(), Some(3));
    assert_eq!(v.pop(), Some(2));
    assert_eq!(v.pop(), Some(1));
    assert_eq!(v.pop(), None);
}

#[test]
fn test_default_is_unallocated() {
    let v: DynamicArray<i32> = DynamicArray::default();
    assert_eq!(v.len(), 0);
    assert_eq!(v.capacity(), 0);
    assert!(v.is_empty());
    assert!(v.iter().next().is_none());
    assert!(!v.as_ptr().is_null());
}

#[test]
fn test_with_capacity_is_exact() {
    let v: DynamicArray<u16> = DynamicArray::with_capacity(5);
    assert_eq!(v.capacity(), 5);
    assert_eq!(v.len(), 0);
}

#[test]
fn test_insert_remove() {
    let mut v = DynamicArray::new();
    v.push(1);
    v.push(3);
    assert_eq!(*v.insert(1, 2), 2);
    assert_eq!(v.as_ref(), &[1, 2, 3]);
    assert_eq!(v.remove(1), 2);
    assert_eq!(v.as_ref(), &[1, 3]);
}

#[test]
fn test_insert_at_end_and_full() {
    let mut v = DynamicArray::with_capacity(2);
    v.push('a');
    v.push('b');
    v.insert(2, 'c');
    v.insert(0, 'z');
    assert_eq!(v, ['z', 'a', 'b', 'c']);
}

#[test]
fn test_emplace_back_returns_slot() {
    let mut v: DynamicArray<String> = DynamicArray::new();
    v.emplace_back(|| "left".to_string()).push_str("-most");
    v.emplace_back(String::new).push('x');
    assert_eq!(v, ["left-most".to_string(), "x".to_string()]);
}

#[test]
fn test_emplace_in_middle() {
    let mut v = dynarray![1, 2, 4];
    assert_eq!(v.capacity(), 3);
    let slot = v.emplace(2, || 3);
    *slot *= 10;
    assert_eq!(v, [1, 2, 30, 4]);
    v.emplace(0, || 0);
    assert_eq!(v, [0, 1, 2, 30, 4]);
}

#[test]
fn test_emplace_panic_keeps_state() {
    let mut v = dynarray![1, 2];
    let before_ptr = v.as_ptr();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace_back(|| panic!("construct failed"));
    }));
    assert!(result.is_err());
    assert_eq!(v, [1, 2]);
    assert_eq!(v.capacity(), 2);
    assert_eq!(v.as_ptr(), before_ptr);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace(1, || panic!("construct failed"));
    }));
    assert!(result.is_err());
    assert_eq!(v, [1, 2]);
    assert_eq!(v.capacity(), 2);
}

#[test]
fn test_emplace_panic_with_room_does_not_shift() {
    let mut v = DynamicArray::with_capacity(8);
    v.extend([1, 2, 3]);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace(0, || panic!("construct failed"));
    }));
    assert!(result.is_err());
    assert_eq!(v, [1, 2, 3]);
}

#[test]
fn test_emplace_grow_moves_without_extra_drops() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = DynamicArray::with_capacity(2);
    v.push((Droppable(counter.clone()), "a".to_string()));
    v.push((Droppable(counter.clone()), "c".to_string()));

    let slot = v.emplace(1, || (Droppable(counter.clone()), "b".to_string()));
    slot.1.push('!');
    assert_eq!(v.len(), 3);
    assert_eq!(v.capacity(), 4);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    let names: Vec<&str> = v.iter().map(|(_, s)| s.as_str()).collect();
    assert_eq!(names, ["a", "b!", "c"]);

    v.push((Droppable(counter.clone()), "d".to_string()));
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.emplace(2, || panic!("construct failed"));
    }));
    assert!(result.is_err());
    assert_eq!(v.len(), 4);
    assert_eq!(v.capacity(), 4);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    drop(v);
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[test]
fn test_grow_and_shrink() {
    let mut v = DynamicArray::with_capacity(2);
    assert_eq!(v.capacity(), 2);
    v.push(1);
    v.push(2);
    v.push(3);
    assert!(v.capacity() >= 3);
    v.shrink_to_fit();
    assert_eq!(v.capacity(), 3);
    v.pop();
    v.pop();
    v.pop();
    v.shrink_to_fit();
    assert_eq!(v.capacity(), 0);
}

#[test]
fn test_reserve_is_total_and_exact() {
    let mut v = dynarray![1, 2];
    v.reserve(1);
    assert_eq!(v.capacity(), 2);
    v.reserve(10);
    assert_eq!(v.capacity(), 10);
    assert_eq!(v.len(), 2);
    assert_eq!(v, [1, 2]);
}

#[test]
fn test_try_reserve() {
    let mut v: DynamicArray<i32> = DynamicArray::new();
    assert!(v.try_reserve(10).is_ok());
    assert!(v.capacity() >= 10);
}

#[test]
fn test_try_reserve_overflow_leaves_array() {
    let mut v = dynarray![1u64, 2, 3];
    assert_eq!(v.try_reserve(usize::MAX), Err(AllocError::CapacityOverflow));
    assert_eq!(v, [1, 2, 3]);
    assert_eq!(v.capacity(), 3);
}

#[test]
fn test_resize() {
    let mut v: DynamicArray<i32> = DynamicArray::new();
    v.resize(3);
    assert_eq!(v, [0, 0, 0]);
    assert_eq!(v.capacity(), 3);
    v.resize_fill(5, 7);
    assert_eq!(v, [0, 0, 0, 7, 7]);
    v.resize(1);
    assert_eq!(v, [0]);
    let mut n = 0;
    v.resize_with(4, || {
        n += 1;
        n
    });
    assert_eq!(v, [0, 1, 2, 3]);
}

#[test]
fn test_resize_with_panic_counts_only_built() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = DynamicArray::new();
    let mut built = 0;
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        v.resize_with(5, || {
            if built == 3 {
                panic!("out of values");
            }
            built += 1;
            Droppable(counter.clone())
        });
    }));
    assert!(result.is_err());
    assert_eq!(v.len(), 3);
    drop(v);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_assign() {
    let mut v = dynarray![1, 2, 3, 4];
    v.assign(2, 9);
    assert_eq!(v, [9, 9]);
    v.assign_from_slice(&[5, 6, 7]);
    assert_eq!(v, [5, 6, 7]);
    v.assign_iter(10..12);
    assert_eq!(v, [10, 11]);
    v.assign(0, 1);
    assert!(v.is_empty());
}

#[test]
fn test_erase() {
    let mut v = dynarray![10, 20, 30];
    assert_eq!(v.erase(1), 1);
    assert_eq!(v, [10, 30]);
    let next = v.erase(1);
    assert_eq!(next, v.len());
    assert_eq!(v, [10]);
}

#[test]
fn test_erase_range() {
    let mut v: DynamicArray<i32> = (0..8).collect();
    assert_eq!(v.erase_range(2..5), 2);
    assert_eq!(v, [0, 1, 5, 6, 7]);
    assert_eq!(v.erase_range(3..3), 3);
    assert_eq!(v.len(), 5);
    assert_eq!(v.erase_range(..=1), 0);
    assert_eq!(v, [5, 6, 7]);
    assert_eq!(v.erase_range(1..), 1);
    assert_eq!(v, [5]);
}

#[test]
fn test_erase_range_drops_exactly_erased() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = DynamicArray::new();
    for _ in 0..6 {
        v.push(Droppable(counter.clone()));
    }
    v.erase_range(1..4);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    assert_eq!(v.len(), 3);
    drop(v);
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}

#[test]
fn test_clear_keeps_capacity() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = DynamicArray::new();
    for _ in 0..5 {
        v.push(Droppable(counter.clone()));
    }
    let cap = v.capacity();
    v.clear();
    assert!(v.is_empty());
    assert_eq!(v.capacity(), cap);
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_truncate() {
    let mut v = dynarray![1, 2, 3, 4];
    v.truncate(10);
    assert_eq!(v.len(), 4);
    v.truncate(2);
    assert_eq!(v, [1, 2]);
    assert_eq!(v.capacity(), 4);
}

#[test]
fn test_raii_drop() {
    let counter = Arc::new(AtomicUsize::new(0));

    {
        let mut v = DynamicArray::new();
        for _ in 0..10 {
            v.push(Droppable(counter.clone()));
        }
    }
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_drop_in_index_order() {
    struct Ordered(usize, Arc<std::sync::Mutex<Vec<usize>>>);
    impl Drop for Ordered {
        fn drop(&mut self) {
            self.1.lock().unwrap().push(self.0);
        }
    }

    let log = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut v = DynamicArray::new();
    for i in 0..4 {
        v.push(Ordered(i, log.clone()));
    }
    drop(v);
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3]);
}

#[test]
fn test_clone_is_deep_and_tight() {
    let mut a = DynamicArray::with_capacity(16);
    a.extend(["x".to_string(), "y".to_string()]);
    let mut b = a.clone();
    assert_eq!(a, b);
    assert_eq!(b.capacity(), 2);
    b[0].push('!');
    a.push("z".to_string());
    assert_eq!(a, ["x", "y", "z"].map(String::from));
    assert_eq!(b, ["x!", "y"].map(String::from));
}

#[test]
fn test_clone_from_replaces() {
    let mut a = dynarray![1, 2, 3, 4, 5];
    let b = dynarray![7];
    a.clone_from(&b);
    assert_eq!(a, [7]);
    assert_eq!(b, [7]);
}

#[test]
fn test_clone_panic_does_not_leak() {
    static CLONES: AtomicUsize = AtomicUsize::new(0);
    static DROPS: AtomicUsize = AtomicUsize::new(0);

    struct Fragile;
    impl Clone for Fragile {
        fn clone(&self) -> Self {
            if CLONES.fetch_add(1, Ordering::SeqCst) == 2 {
                panic!("clone failed");
            }
            Fragile
        }
    }
    impl Drop for Fragile {
        fn drop(&mut self) {
            DROPS.fetch_add(1, Ordering::SeqCst);
        }
    }

    let source: DynamicArray<Fragile> = (0..5).map(|_| Fragile).collect();
    let result = panic::catch_unwind(AssertUnwindSafe(|| source.clone()));
    assert!(result.is_err());
    // The two clones that were built have been dropped again.
    assert_eq!(DROPS.load(Ordering::SeqCst), 2);
    assert_eq!(source.len(), 5);
}

#[test]
fn test_take_leaves_empty_reusable() {
    let mut a = dynarray![1, 2, 3];
    let b = a.take();
    assert_eq!(b, [1, 2, 3]);
    assert_eq!(a.len(), 0);
    assert_eq!(a.capacity(), 0);
    a.push(4);
    assert_eq!(a, [4]);
}

#[test]
fn test_accessors() {
    let mut v = dynarray![5, 6, 7];
    assert_eq!(v.at(1), Ok(&6));
    assert_eq!(v.at(5), Err(OutOfRange { index: 5, len: 3 }));
    *v.at_mut(0).unwrap() = 4;
    assert_eq!(v.front(), Some(&4));
    assert_eq!(v.back(), Some(&7));
    *v.back_mut().unwrap() = 8;
    *v.front_mut().unwrap() = 3;
    assert_eq!(v, [3, 6, 8]);
    assert_eq!(unsafe { *v.as_ptr().add(1) }, 6);

    assert_eq!(v.at_mut(9), Err(OutOfRange { index: 9, len: 3 }));
    assert_eq!(v, [3, 6, 8]);

    let empty: DynamicArray<u8> = DynamicArray::new();
    assert_eq!(empty.front(), None);
    assert_eq!(empty.back(), None);
}

#[test]
fn test_alloc_failed_reports_layout_size() {
    let layout = std::alloc::Layout::array::<u64>(16).unwrap();
    let err = AllocError::AllocFailed { layout };
    assert_eq!(err.to_string(), "allocation of 128 bytes failed");
    assert_eq!(AllocError::CapacityOverflow.to_string(), "capacity overflow");
}

#[test]
fn test_swap_exchanges_buffers() {
    let mut a = dynarray![1, 2, 3];
    let mut b = DynamicArray::new();
    std::mem::swap(&mut a, &mut b);
    assert!(a.is_empty());
    assert_eq!(a.capacity(), 0);
    assert_eq!(b, [1, 2, 3]);
}

#[test]
fn test_out_of_range_message() {
    let v = dynarray![1];
    let err = v.at(3).unwrap_err();
    assert_eq!(err.to_string(), "index 3 out of range for array of length 1");
}

#[test]
fn test_comparisons() {
    let a = dynarray![1, 2, 3];
    let b = dynarray![1, 2, 3];
    let prefix = dynarray![1, 2];
    let bigger = dynarray![1, 3];
    assert_eq!(a, b);
    assert!(prefix < a);
    assert!(a < bigger);
    assert!(bigger > prefix);
    assert_ne!(a, prefix);
    assert_eq!(a, vec![1, 2, 3]);
    assert_eq!(a, &[1, 2, 3][..]);
    assert_eq!(a.cmp(&b), std::cmp::Ordering::Equal);
}

#[test]
fn test_iterators() {
    let mut v = DynamicArray::new();
    v.push(10);
    v.push(20);
    v.push(30);

    let mut sum = 0;
    for &x in &v {
        sum += x;
    }
    assert_eq!(sum, 60);

    for x in &mut v {
        *x += 1;
    }
    assert_eq!(v[0], 11);

    let collected: Vec<i32> = v.into_iter().collect();
    assert_eq!(collected, vec![11, 21, 31]);
}

#[test]
fn test_into_iter_partial_drop() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut v = DynamicArray::new();
    for _ in 0..6 {
        v.push(Droppable(counter.clone()));
    }
    let mut it = v.into_iter();
    assert_eq!(it.len(), 6);
    drop(it.next());
    drop(it.next_back());
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(it.len(), 4);
    drop(it);
    assert_eq!(counter.load(Ordering::SeqCst), 6);
}

#[test]
fn test_zero_sized_elements() {
    let mut v = DynamicArray::new();
    for _ in 0..100 {
        v.push(());
    }
    assert_eq!(v.len(), 100);
    assert_eq!(v.capacity(), usize::MAX);
    v.insert(50, ());
    v.erase_range(..10);
    assert_eq!(v.len(), 91);
    assert_eq!(v.into_iter().count(), 91);
}

#[test]
fn test_growth_policy_is_configurable() {
    let mut v: DynamicArray<u32, OneAndAHalf> = DynamicArray::new_in_policy();
    v.push(1);
    assert_eq!(v.capacity(), 4);
    v.extend([2, 3, 4, 5]);
    assert_eq!(v.capacity(), 6);

    let mut d: DynamicArray<u32> = DynamicArray::new();
    d.push(1);
    assert_eq!(d.capacity(), 1);
    d.push(2);
    assert_eq!(d.capacity(), 2);
    d.push(3);
    assert_eq!(d.capacity(), 4);
}

#[test]
fn test_max_size() {
    let v: DynamicArray<u32> = DynamicArray::new();
    assert_eq!(v.max_size(), isize::MAX as usize / 4);
    let z: DynamicArray<()> = DynamicArray::new();
    assert_eq!(z.max_size(), usize::MAX);
}

#[test]
fn test_concurrency() {
    let mut v = DynamicArray::new();
    for i in 0..100 {
        v.push(i);
    }

    scope(|s| {
        s.spawn(|_| {
            for x in &v {
                let _ = *x;
            }
        });
        s.spawn(|_| {
            for x in &v {
                let _ = *x;
            }
        });
    })
    .unwrap();
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_remove() {
    let mut v: DynamicArray<i32> = DynamicArray::new();
    v.remove(0);
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_insert() {
    let mut v: DynamicArray<i32> = DynamicArray::new();
    v.insert(1, 10);
}

#[test]
#[should_panic(expected = "Index out of bounds")]
fn test_out_of_bounds_erase_range() {
    let mut v = dynarray![1, 2, 3];
    v.erase_range(2..5);
}
