use dynarray::DynamicArray;
use log::info;
use std::sync::mpsc;
use std::thread;

fn main() {
    pretty_env_logger::init();

    println!("--- Ownership Hand-off Example ---");
    let (tx, rx) = mpsc::channel::<DynamicArray<u32>>();

    let worker = thread::spawn(move || {
        let mut total = 0;
        for batch in rx {
            println!("Worker got batch {:?} (cap {})", batch, batch.capacity());
            total += batch.iter().sum::<u32>();
        }
        total
    });

    let mut pending = DynamicArray::new();
    for i in 0..10 {
        pending.push(i);
        if pending.len() == 4 {
            // take() hands the block over and leaves `pending` unallocated
            let batch = pending.take();
            info!("sending {} elements, sender cap now {}", batch.len(), pending.capacity());
            assert_eq!(pending.capacity(), 0);
            tx.send(batch).expect("worker hung up");
        }
    }
    if !pending.is_empty() {
        tx.send(pending.take()).expect("worker hung up");
    }
    drop(tx);

    let total = worker.join().expect("worker thread panicked");
    println!("Worker summed {} elements to {}", 10, total);
    assert_eq!(total, (0..10).sum::<u32>());
}
