//! Diagnostic helpers for verifying heap structural invariants.
//!
//! This module is test-and-tooling-only: nothing on the `alloc`/`free` hot
//! path calls into it. It plays the same role ad-hoc debugging prints play
//! in a hand-rolled allocator, generalized into something a test suite or
//! the CLI harness's `stats` command can call directly.

use crate::config::{DSIZE, MIN_BLOCK_SIZE};
use crate::heap::HeapManager;
use crate::tag::{get, get_alloc, get_size, hdrp, next_blkp};

/// One ordinary block as seen by a heap walk: its payload size field and
/// allocation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
  pub block_ptr: *const u8,
  pub size: usize,
  pub allocated: bool,
}

/// Walks every ordinary block between the prologue and the epilogue, in
/// address order.
///
/// # Safety
/// `heap` must be a validly initialized heap whose invariants have not
/// already been violated by undefined behavior elsewhere.
pub fn walk(heap: &HeapManager) -> Vec<BlockInfo> {
  let mut blocks = Vec::new();
  unsafe {
    let mut bp = next_blkp(heap.heap_listp());
    loop {
      let header = get(hdrp(bp));
      let size = get_size(header);
      if size == 0 {
        break;
      }
      blocks.push(BlockInfo {
        block_ptr: bp,
        size,
        allocated: get_alloc(header),
      });
      bp = next_blkp(bp);
    }
  }
  blocks
}

/// Checks the structural invariants that can be verified from heap state
/// alone (header/footer agreement, minimum size, no coalescable pair,
/// sentinels, walkability). Returns every violation found, rather than
/// stopping at the first one, so a single failing run surfaces the full
/// picture.
///
/// Invariants about *outstanding allocations* (alignment of returned
/// pointers, sufficiency, disjointness, determinism, capacity) are the
/// caller's responsibility to check against the pointers it holds, this
/// function only sees heap structure, not the call history that produced
/// it.
pub fn verify_structural_invariants(heap: &HeapManager) -> Result<(), Vec<String>> {
  let mut violations = Vec::new();

  unsafe {
    let prologue_header = get(heap.heap_listp().sub(crate::config::WSIZE));
    let prologue_footer = get(heap.heap_listp());
    if get_size(prologue_header) != DSIZE || !get_alloc(prologue_header) {
      violations.push(format!(
        "prologue header malformed: size={} alloc={}",
        get_size(prologue_header),
        get_alloc(prologue_header)
      ));
    }
    if prologue_header != prologue_footer {
      violations.push("prologue header/footer disagree".to_string());
    }
  }

  let blocks = walk(heap);
  let mut prev_free = false;
  for b in &blocks {
    if b.size < MIN_BLOCK_SIZE || b.size % DSIZE != 0 {
      violations.push(format!(
        "block at {:?} has invalid size {} (must be >= {} and a multiple of {})",
        b.block_ptr, b.size, MIN_BLOCK_SIZE, DSIZE
      ));
    }
    if (b.block_ptr as usize) % DSIZE != 0 {
      violations.push(format!("block at {:?} is not double-word aligned", b.block_ptr));
    }
    if !b.allocated && prev_free {
      violations.push(format!(
        "block at {:?} is free and immediately follows another free block",
        b.block_ptr
      ));
    }
    unsafe {
      let header = get(hdrp(b.block_ptr as *mut u8));
      let footer = get(crate::tag::ftrp(b.block_ptr as *mut u8));
      if header != footer {
        violations.push(format!("block at {:?}: header != footer", b.block_ptr));
      }
    }
    prev_free = !b.allocated;
  }

  unsafe {
    let last = blocks
      .last()
      .map(|b| next_blkp(b.block_ptr as *mut u8))
      .unwrap_or_else(|| next_blkp(heap.heap_listp()));
    let epilogue = get(hdrp(last));
    if get_size(epilogue) != 0 || !get_alloc(epilogue) {
      violations.push(format!(
        "epilogue malformed: size={} alloc={} (expected size=0, alloc=1)",
        get_size(epilogue),
        get_alloc(epilogue)
      ));
    }
    let sum: usize = blocks.iter().map(|b| b.size).sum();
    let expected = heap.mem().heap_size() - 4 * crate::config::WSIZE;
    if sum != expected {
      violations.push(format!(
        "block sizes sum to {sum}, expected {expected} (heap_size minus padding/prologue/epilogue)"
      ));
    }
  }

  if violations.is_empty() {
    Ok(())
  } else {
    Err(violations)
  }
}
