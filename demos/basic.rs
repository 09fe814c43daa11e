use dynarray::{DynamicArray, dynarray};
use log::info;

fn main() {
    pretty_env_logger::init();

    println!("--- Basic Usage Example ---");
    let mut arr = DynamicArray::new();

    // Push elements; watch capacity double
    for i in 1..=5 {
        arr.push(i * 10);
        println!("Pushed: {}, len: {}, cap: {}", i * 10, arr.len(), arr.capacity());
    }

    // Slice view through Deref
    println!("Elements: {:?}", &arr[..]);

    arr.insert(2, 25);
    arr.erase_range(..1);
    println!("After insert/erase: {:?}", arr);

    match arr.at(10) {
        Ok(x) => println!("at(10) = {}", x),
        Err(e) => println!("at(10) failed: {}", e),
    }

    arr.shrink_to_fit();
    info!("shrunk to {} slots", arr.capacity());

    while let Some(val) = arr.pop() {
        println!("Popped: {}, len: {}", val, arr.len());
    }

    let literal = dynarray![5, 6, 7];
    println!("Literal: {:?}, cap: {}", literal, literal.capacity());
}
