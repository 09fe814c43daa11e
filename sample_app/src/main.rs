use anyhow::{Context, Result, ensure};
use dynarray::{DynamicArray, dynarray};
use log::info;

fn main() -> Result<()> {
    pretty_env_logger::init();

    println!("Initializing DynamicArray...");
    let mut array = dynarray![1, 2, 3];
    info!("start: {:?} (cap {})", array, array.capacity());

    array.insert(1, 9);
    expect_contents(&array, &[1, 9, 2, 3]).context("after insert(1, 9)")?;

    array.erase(0);
    expect_contents(&array, &[9, 2, 3]).context("after erase(0)")?;

    array.push(7);
    expect_contents(&array, &[9, 2, 3, 7]).context("after push(7)")?;

    array.pop();
    expect_contents(&array, &[9, 2, 3]).context("after pop()")?;

    println!("Iterating elements:");
    for (i, val) in array.iter().enumerate() {
        println!("Index {}: {}", i, val);
    }

    let value = array.at(1).context("checked access")?;
    println!("at(1) = {}", value);
    match array.at(5) {
        Ok(_) => anyhow::bail!("at(5) should be out of range"),
        Err(e) => println!("at(5): {}", e),
    }

    let moved = array.take();
    ensure!(array.is_empty() && array.capacity() == 0, "moved-from array is not empty");
    println!("Moved {} elements, source now len {}", moved.len(), array.len());

    println!("Integration test passed successfully.");
    Ok(())
}

fn expect_contents(array: &DynamicArray<i32>, expected: &[i32]) -> Result<()> {
    info!("{:?} (len {}, cap {})", array, array.len(), array.capacity());
    ensure!(
        array == expected,
        "expected {:?}, found {:?}",
        expected,
        array
    );
    Ok(())
}
