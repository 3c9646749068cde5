//! Interactive, step-by-step walkthrough of the simulated boundary-tag
//! heap: splitting a seeded free block, reusing freed space via
//! first-fit, and extending the heap once that space runs out.

use std::io::Read;

use heapsim::check;
use heapsim::HeapManager;

fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

fn print_heap_state(heap: &HeapManager, label: &str) {
  let blocks = check::walk(heap);
  println!(
    "[{label}] heap_size = {} bytes, {} ordinary blocks",
    heap.mem().heap_size(),
    blocks.len()
  );
  for b in &blocks {
    println!(
      "    {:?}: size={:<6} {}",
      b.block_ptr,
      b.size,
      if b.allocated { "allocated" } else { "free" }
    );
  }
}

fn main() {
  env_logger::init();

  let mut heap = HeapManager::init_default().expect("heap init");

  // --------------------------------------------------------------------
  // 1) Initial layout: padding, prologue, one big free block, epilogue.
  // --------------------------------------------------------------------
  println!("\n[1] Freshly initialized heap");
  print_heap_state(&heap, "init");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) A small allocation shrinks the seeded free block.
  // --------------------------------------------------------------------
  let first = heap.alloc(4).unwrap();
  println!("\n[2] Allocate 4 bytes -> {first:?}");
  unsafe {
    (first as *mut u32).write(0xDEADBEEF);
    println!("    wrote 0x{:X}", (first as *mut u32).read());
  }
  print_heap_state(&heap, "after alloc(4)");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) A second, larger allocation, to give us something to coalesce
  //    around later.
  // --------------------------------------------------------------------
  let second = heap.alloc(100).unwrap();
  println!("\n[3] Allocate 100 bytes -> {second:?}");
  unsafe {
    std::ptr::write_bytes(second, 0xAB, 100);
  }
  print_heap_state(&heap, "after alloc(100)");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) Free the first block. With only allocated neighbors it stays
  //    isolated, no coalescing yet.
  // --------------------------------------------------------------------
  unsafe {
    heap.free(first);
  }
  println!("\n[4] Freed the first block");
  print_heap_state(&heap, "after free(first)");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Allocate 2 bytes: first-fit should reuse the freed block exactly.
  // --------------------------------------------------------------------
  let third = heap.alloc(2).unwrap();
  println!(
    "\n[5] Allocate 2 bytes -> {third:?} (reused first block? {})",
    third == first
  );
  print_heap_state(&heap, "after alloc(2)");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 6) Allocate until the seeded free block is exhausted and the heap
  //    has to extend.
  // --------------------------------------------------------------------
  let before = heap.mem().heap_size();
  println!("\n[6] Allocating a block larger than any existing free space...");
  let big = heap.alloc(heap.config().chunk).unwrap();
  println!(
    "    heap grew from {before} to {} bytes ({big:?})",
    heap.mem().heap_size()
  );
  print_heap_state(&heap, "after heap extension");

  if let Err(violations) = check::verify_structural_invariants(&heap) {
    println!("\n!! invariant violations detected:");
    for v in violations {
      println!("   - {v}");
    }
  } else {
    println!("\nall structural invariants hold.");
  }

  let _ = second;
}
