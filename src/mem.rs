//! The backing store: a fixed-capacity, contiguous region of simulated
//! virtual memory with a monotonically advancing break pointer, addressed
//! the same way `libc::sbrk` would address real process memory.
//!
//! Here the "operating system" is a single owned byte buffer, so the
//! allocator under test never touches the host process's real heap and its
//! addresses are reproducible across runs.

use crate::error::AllocError;

/// Simulates a growable memory region backed by a single fixed allocation.
///
/// The buffer is allocated once, at its full capacity, and never
/// reallocated, so pointers handed out via [`MemorySim::sbrk`] stay valid
/// for the lifetime of the `MemorySim`, exactly as real `sbrk`-returned
/// addresses stay valid until the break is moved back past them.
pub struct MemorySim {
  heap: Box<[u8]>,
  /// Offset of the current break, relative to `heap.as_ptr()`.
  brk: usize,
}

impl MemorySim {
  /// Acquires a contiguous region of `capacity` bytes and starts the
  /// break at the region's base (empty heap).
  pub fn init(capacity: usize) -> Self {
    Self {
      heap: vec![0u8; capacity].into_boxed_slice(),
      brk: 0,
    }
  }

  /// Extends the in-use region by `incr` bytes and returns a pointer to
  /// the first byte of the newly exposed range (the *old* break).
  ///
  /// Fails, returning `OutOfMemory`, if `incr` is negative or would
  /// push the break past the region's capacity. On failure the break is
  /// left unchanged.
  pub fn sbrk(&mut self, incr: isize) -> Result<*mut u8, AllocError> {
    if incr < 0 {
      return Err(AllocError::OutOfMemory {
        requested: 0,
        available: self.heap.len() - self.brk,
      });
    }
    let incr = incr as usize;
    let available = self.heap.len() - self.brk;
    if incr > available {
      return Err(AllocError::OutOfMemory {
        requested: incr,
        available,
      });
    }

    let old_brk = self.brk;
    self.brk += incr;
    // SAFETY: old_brk + incr <= heap.len(), so this stays in bounds.
    Ok(unsafe { self.heap.as_mut_ptr().add(old_brk) })
  }

  /// The first valid byte of the region.
  pub fn heap_lo(&self) -> *const u8 {
    self.heap.as_ptr()
  }

  /// The last valid byte currently in use, or the base if the heap is
  /// empty.
  pub fn heap_hi(&self) -> *const u8 {
    let last = self.brk.saturating_sub(1);
    // SAFETY: last < heap.len() whenever heap.len() > 0.
    unsafe { self.heap.as_ptr().add(last) }
  }

  /// Number of bytes currently in use, between `heap_lo()` and the break.
  pub fn heap_size(&self) -> usize {
    self.brk
  }

  /// Total capacity of the backing region.
  pub fn capacity(&self) -> usize {
    self.heap.len()
  }

  /// Host page size, purely informational.
  pub fn page_size(&self) -> usize {
    // SAFETY: sysconf with a valid name never has preconditions beyond
    // the name itself being recognized, which _SC_PAGESIZE always is.
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size > 0 {
      page_size as usize
    } else {
      4096
    }
  }

  /// Resets the break to the region's base, as if nothing had ever been
  /// allocated. Intended for test harnesses.
  pub fn reset_brk(&mut self) {
    self.brk = 0;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn init_starts_empty() {
    let mem = MemorySim::init(1024);
    assert_eq!(mem.heap_size(), 0);
    assert_eq!(mem.capacity(), 1024);
  }

  #[test]
  fn sbrk_advances_break_and_returns_old_break() {
    let mut mem = MemorySim::init(1024);
    let base = mem.heap_lo();

    let p0 = mem.sbrk(16).unwrap();
    assert_eq!(p0, base as *mut u8);
    assert_eq!(mem.heap_size(), 16);

    let p1 = mem.sbrk(32).unwrap();
    assert_eq!(p1 as usize, base as usize + 16);
    assert_eq!(mem.heap_size(), 48);
  }

  #[test]
  fn sbrk_rejects_negative_increment() {
    let mut mem = MemorySim::init(1024);
    assert!(mem.sbrk(-1).is_err());
    assert_eq!(mem.heap_size(), 0);
  }

  #[test]
  fn sbrk_rejects_growth_past_capacity() {
    let mut mem = MemorySim::init(64);
    assert!(mem.sbrk(128).is_err());
    // Failed growth must not perturb the break.
    assert_eq!(mem.heap_size(), 0);

    mem.sbrk(64).unwrap();
    assert!(mem.sbrk(1).is_err());
  }

  #[test]
  fn reset_brk_returns_to_base() {
    let mut mem = MemorySim::init(1024);
    mem.sbrk(100).unwrap();
    mem.reset_brk();
    assert_eq!(mem.heap_size(), 0);
  }

  #[test]
  fn heap_hi_tracks_last_used_byte() {
    let mut mem = MemorySim::init(1024);
    let base = mem.heap_lo() as usize;
    mem.sbrk(10).unwrap();
    assert_eq!(mem.heap_hi() as usize, base + 9);
  }
}
