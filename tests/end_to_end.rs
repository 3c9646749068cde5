//! End-to-end scenarios exercising the allocator through its public
//! surface, plus a sweep of the universal invariants over a fixed,
//! deterministic sequence of allocate/free calls.

use heapsim::check::{verify_structural_invariants, walk};
use heapsim::config::{CHUNK, DSIZE, MAX_HEAP};
use heapsim::{HeapConfig, HeapManager};

fn assert_invariants(heap: &HeapManager) {
  if let Err(violations) = verify_structural_invariants(heap) {
    panic!("invariant violations: {violations:#?}");
  }
}

#[test]
fn scenario_init_lays_out_seeded_free_block() {
  let heap = HeapManager::init_default().unwrap();

  // Padding + prologue + epilogue account for 4 words; the rest is one
  // free block of exactly `chunk` bytes.
  assert_eq!(heap.mem().heap_size(), 4 * heapsim::config::WSIZE + CHUNK);

  let blocks = walk(&heap);
  assert_eq!(blocks.len(), 1);
  assert!(!blocks[0].allocated);
  assert_eq!(blocks[0].size, CHUNK);

  assert_invariants(&heap);
}

#[test]
fn scenario_small_alloc_shrinks_seeded_free_block() {
  let mut heap = HeapManager::init_default().unwrap();
  let before = walk(&heap)[0].size;

  let p = heap.alloc(2).unwrap();
  assert_eq!(p as usize % DSIZE, 0);

  let blocks = walk(&heap);
  assert_eq!(blocks[0].size, 16); // asize = 16 for size <= 8
  assert!(blocks[0].allocated);
  assert_eq!(blocks[1].size, before - 16);
  assert!(!blocks[1].allocated);

  assert_invariants(&heap);
}

#[test]
fn scenario_split_threshold_splits_at_32_but_not_at_24() {
  // Carve the seeded CHUNK-sized free block down to exactly 32 bytes
  // (a payload request of `chunk - 40` rounds up to `asize = chunk - 32`),
  // then split it with an 8-byte request (asize = 16).
  let mut heap = HeapManager::init_default().unwrap();
  heap.alloc(CHUNK - 40).unwrap();
  assert_eq!(walk(&heap).last().unwrap().size, 32);

  heap.alloc(8).unwrap();
  let tail = walk(&heap);
  let last_two = &tail[tail.len() - 2..];
  assert_eq!(last_two[0].size, 16);
  assert!(last_two[0].allocated);
  assert_eq!(last_two[1].size, 16);
  assert!(!last_two[1].allocated);
  assert_invariants(&heap);

  // Carve it down to exactly 24 bytes instead (payload request of
  // `chunk - 32`): the same 8-byte request now consumes the whole block,
  // since an 8-byte remainder is below the minimum block size.
  let mut heap = HeapManager::init_default().unwrap();
  heap.alloc(CHUNK - 32).unwrap();
  assert_eq!(walk(&heap).last().unwrap().size, 24);

  let before_len = walk(&heap).len();
  heap.alloc(8).unwrap();
  let after = walk(&heap);
  assert_eq!(after.len(), before_len); // no split: no new block appeared
  assert!(after.last().unwrap().allocated);
  assert_eq!(after.last().unwrap().size, 24);
  assert_invariants(&heap);
}

#[test]
fn scenario_coalesce_all_four_cases() {
  let mut heap = HeapManager::init_default().unwrap();
  let a = heap.alloc(16).unwrap();
  let b = heap.alloc(16).unwrap();
  let c = heap.alloc(16).unwrap();

  // (a) Free B: both neighbors allocated, stays isolated.
  unsafe {
    heap.free(b);
  }
  {
    let blocks = walk(&heap);
    let b_block = blocks.iter().find(|blk| blk.block_ptr == b as *const u8).unwrap();
    assert!(!b_block.allocated);
    assert_eq!(b_block.size, 32);
  }
  assert_invariants(&heap);

  // (b) Free C: B (free) + C merge into one 64-byte free block.
  unsafe {
    heap.free(c);
  }
  {
    let blocks = walk(&heap);
    let merged = blocks.iter().find(|blk| blk.block_ptr == b as *const u8).unwrap();
    assert!(!merged.allocated);
    assert_eq!(merged.size, 64);
  }
  assert_invariants(&heap);

  // (c) Re-allocate B and C, then free A, C, B in that order: the final
  // free (of the middle block) must absorb both neighbors at once.
  let b2 = heap.alloc(16).unwrap();
  let c2 = heap.alloc(16).unwrap();
  assert_eq!(b2, b);
  unsafe {
    heap.free(a);
    heap.free(c2);
    heap.free(b2);
  }
  let blocks = walk(&heap);
  let merged = blocks.iter().find(|blk| blk.block_ptr == a as *const u8).unwrap();
  assert!(!merged.allocated);
  assert_eq!(merged.size, 96);
  assert_invariants(&heap);
}

#[test]
fn scenario_heap_extension_on_exhaustion() {
  let mut heap = HeapManager::init_default().unwrap();
  let chunk = heap.config().chunk;

  // Consume the whole seeded block with one allocation sized so that
  // asize comes out to exactly `chunk`.
  heap.alloc(chunk - 2 * DSIZE).unwrap();
  assert_eq!(walk(&heap).len(), 1);
  assert!(walk(&heap)[0].allocated);

  let before_heap_size = heap.mem().heap_size();
  let q = heap.alloc(64).unwrap();
  assert!(!q.is_null());
  assert_eq!(heap.mem().heap_size(), before_heap_size + chunk);
  assert_invariants(&heap);
}

#[test]
fn scenario_exhaustion_then_recovery() {
  let mut heap = HeapManager::init(HeapConfig {
    max_heap: 3 * CHUNK,
    chunk: CHUNK,
    ..HeapConfig::default()
  })
  .unwrap();

  // A 1 MiB request exceeds this heap's 12 KiB capacity outright, so it
  // fails immediately and repeatably.
  for _ in 0..3 {
    assert!(heap.alloc(1 << 20).is_none());
  }

  // Smaller allocations that fit existing or newly extended space still
  // succeed, and the heap remains structurally valid throughout.
  let small = heap.alloc(16);
  assert!(small.is_some());
  assert_invariants(&heap);
}

#[test]
fn universal_invariants_hold_over_a_long_deterministic_sequence() {
  let mut heap = HeapManager::init_default().unwrap();
  let mut live: Vec<(*mut u8, usize)> = Vec::new();

  // A fixed, hand-picked sequence of sizes and frees - deterministic,
  // no randomness - that exercises splitting, reuse, and coalescing
  // together.
  let sizes = [4, 100, 16, 8, 256, 1, 4096, 12, 64, 9000, 3, 32];
  for (i, &size) in sizes.iter().enumerate() {
    if let Some(p) = heap.alloc(size) {
      assert_eq!(p as usize % DSIZE, 0, "allocation {i} misaligned");
      unsafe {
        std::ptr::write_bytes(p, (i % 256) as u8, size.max(1));
      }
      live.push((p, size));
    }
    if i % 3 == 2 && !live.is_empty() {
      let (p, _) = live.remove(0);
      unsafe {
        heap.free(p);
      }
    }
    assert_invariants(&heap);
  }

  // Disjointness: no two still-live payload ranges may overlap.
  for i in 0..live.len() {
    for j in (i + 1)..live.len() {
      let (pi, si) = live[i];
      let (pj, sj) = live[j];
      let (lo_i, hi_i) = (pi as usize, pi as usize + si);
      let (lo_j, hi_j) = (pj as usize, pj as usize + sj);
      assert!(hi_i <= lo_j || hi_j <= lo_i, "live allocations overlap");
    }
  }

  // Capacity: every live pointer falls within [heap_lo, heap_hi].
  let lo = heap.mem().heap_lo() as usize;
  let hi = heap.mem().heap_hi() as usize;
  for (p, _) in &live {
    let addr = *p as usize;
    assert!(addr >= lo && addr <= hi, "pointer escaped backing region");
  }

  for (p, _) in live {
    unsafe {
      heap.free(p);
    }
  }
  assert_invariants(&heap);
}

#[test]
fn determinism_same_call_sequence_same_offsets() {
  fn run() -> Vec<usize> {
    let mut heap = HeapManager::init_default().unwrap();
    let base = heap.mem().heap_lo() as usize;
    let mut offsets = Vec::new();
    for size in [4, 20, 100, 8, 4096] {
      if let Some(p) = heap.alloc(size) {
        offsets.push(p as usize - base);
      }
    }
    offsets
  }

  assert_eq!(run(), run());
}

#[test]
fn oversize_request_beyond_max_heap_fails_immediately_without_growing() {
  let mut heap = HeapManager::init_default().unwrap();
  let before = heap.mem().heap_size();
  assert!(heap.alloc(MAX_HEAP + 1).is_none());
  assert_eq!(heap.mem().heap_size(), before);
}
