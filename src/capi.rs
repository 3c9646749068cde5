//! C-compatible four-function surface: `mem_init`, `mm_init`, `mm_malloc`,
//! and `mm_free`, for any enclosing program that wants that literal shape.
//! Internally this is just a thin adapter over one process-wide
//! [`HeapManager`]; the encapsulated type is still the source of truth,
//! this module exists only so C-shaped callers have a place to reach it
//! from.
//!
//! A `Mutex` guards the global, not to support concurrent allocation (out
//! of scope here) but because that's the only safe place for mutable
//! global state to live in Rust; callers are still expected to drive this
//! surface from a single thread at a time.

use std::ffi::c_int;
use std::sync::{Mutex, OnceLock};

use crate::config::HeapConfig;
use crate::heap::HeapManager;

static HEAP: OnceLock<Mutex<Option<HeapManager>>> = OnceLock::new();

fn global() -> &'static Mutex<Option<HeapManager>> {
  HEAP.get_or_init(|| Mutex::new(None))
}

/// Initializes the backing store. In this encapsulated design the backing
/// store and the heap manager are created together by [`mm_init`]; this
/// function exists purely so the four-function surface matches the
/// original shape literally, and clears any previous heap so a fresh
/// `mm_init` starts empty.
#[no_mangle]
pub extern "C" fn mem_init() {
  let mut guard = global().lock().unwrap();
  *guard = None;
}

/// Initializes the heap with the default configuration. Returns `0` on
/// success, `-1` on failure, matching the original `mm_init` contract.
#[no_mangle]
pub extern "C" fn mm_init() -> c_int {
  match HeapManager::init_default() {
    Ok(manager) => {
      *global().lock().unwrap() = Some(manager);
      0
    }
    Err(_) => -1,
  }
}

/// Initializes the heap with a caller-supplied configuration. Not part of
/// the original four-function surface, but useful for callers that want
/// runtime-configurable heap sizing without dropping to the idiomatic API.
/// Kept as a plain Rust function, not `extern "C"`, since `HeapConfig` is
/// passed by value and isn't meant to cross the C boundary.
pub fn mm_init_with_config(config: HeapConfig) -> c_int {
  match HeapManager::init(config) {
    Ok(manager) => {
      *global().lock().unwrap() = Some(manager);
      0
    }
    Err(_) => -1,
  }
}

/// Allocates `size` bytes from the global heap. Returns null if the heap
/// was never initialized, `size == 0`, or no fit could be made.
#[no_mangle]
pub extern "C" fn mm_malloc(size: usize) -> *mut u8 {
  let mut guard = global().lock().unwrap();
  match guard.as_mut() {
    Some(manager) => manager.alloc(size).unwrap_or(std::ptr::null_mut()),
    None => std::ptr::null_mut(),
  }
}

/// Frees a pointer previously returned by [`mm_malloc`] on the global
/// heap. Freeing null is a no-op; freeing anything else invalid is
/// undefined behavior, this function performs no policing beyond the
/// null check.
///
/// # Safety
/// `ptr` must be null or a pointer previously returned by [`mm_malloc`],
/// not yet freed.
#[no_mangle]
pub unsafe extern "C" fn mm_free(ptr: *mut u8) {
  let mut guard = global().lock().unwrap();
  if let Some(manager) = guard.as_mut() {
    unsafe {
      manager.free(ptr);
    }
  }
}
