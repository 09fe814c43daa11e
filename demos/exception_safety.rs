use dynarray::DynamicArray;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Tracked(usize, Arc<AtomicUsize>);

impl Drop for Tracked {
    fn drop(&mut self) {
        println!("Dropping element {}", self.0);
        self.1.fetch_add(1, Ordering::SeqCst);
    }
}

fn main() {
    pretty_env_logger::init();

    println!("--- Exception Safety & RAII Example ---");
    let drop_count = Arc::new(AtomicUsize::new(0));

    {
        let mut arr = DynamicArray::with_capacity(3);
        for i in 0..3 {
            arr.push(Tracked(i, drop_count.clone()));
        }
        println!("Array created with 3 elements, capacity {}.", arr.capacity());

        // The array is full, so this would grow. The constructor panics
        // before any element moves and the array stays as it was.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            arr.emplace_back(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());
        println!("After failed emplace: len {}, cap {}", arr.len(), arr.capacity());
        assert_eq!(arr.len(), 3);
        // Scope ends here, arr is dropped
    }

    println!("Total elements dropped: {}", drop_count.load(Ordering::SeqCst));
    assert_eq!(drop_count.load(Ordering::SeqCst), 3);
}
