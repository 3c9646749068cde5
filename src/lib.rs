//! # heapsim - a simulated boundary-tag heap allocator
//!
//! This crate implements the classical `malloc`/`free` pair over a
//! fixed-capacity, contiguous region of *simulated* virtual memory: an
//! implicit free list of boundary-tagged blocks, first-fit placement,
//! immediate coalescing, and an `sbrk`-shaped heap-extension discipline.
//! It is deliberately a teaching-grade baseline, not a production
//! allocator - see "Non-goals" below.
//!
//! ## Why simulated memory?
//!
//! The allocator under test never touches the host process's real heap.
//! Instead, [`mem::MemorySim`] hands out addresses carved out of one
//! fixed-size, owned byte buffer, so the whole exercise can run inside a
//! sandbox: allocation traces are reproducible across runs (the same call
//! sequence always returns the same addresses, modulo the buffer's own
//! base address), and a corrupted boundary tag can never crash anything
//! outside this crate.
//!
//! ## Crate structure
//!
//! ```text
//!   heapsim
//!   ├── config  - HeapConfig and the WSIZE/DSIZE/CHUNK/MAX_HEAP constants
//!   ├── error   - AllocError
//!   ├── mem     - MemorySim, the simulated backing store
//!   ├── tag     - boundary-tag pack/unpack and HDRP/FTRP/NEXT/PREV helpers
//!   ├── heap    - HeapManager, the core allocate/free algorithm
//!   ├── check   - diagnostic invariant-checking helpers (test/tooling only)
//!   └── capi    - the C-shaped mem_init/mm_init/mm_malloc/mm_free surface
//! ```
//!
//! ## Quick start
//!
//! ```
//! use heapsim::HeapManager;
//!
//! let mut heap = HeapManager::init_default().unwrap();
//!
//! unsafe {
//!     let p = heap.alloc(24).unwrap() as *mut u64;
//!     p.write(0x1122334455667788);
//!     assert_eq!(p.read(), 0x1122334455667788);
//!     heap.free(p as *mut u8);
//! }
//! ```
//!
//! ## Algorithm
//!
//! Each block carries a header and a footer word, packed as
//! `(size, alloc-bit)`. A free block is found by a first-fit walk of the
//! implicit free list (no separate linked structure - "implicit" means
//! every block, free or allocated, is visited); a fit larger than needed
//! is split when the remainder would still meet the minimum block size.
//! Freeing a block immediately coalesces it with any free neighbors using
//! the boundary-tag trick, so the heap never holds two adjacent free
//! blocks. See [`heap`] for the full algorithm and its four coalescing
//! cases.
//!
//! ## Non-goals
//!
//! Thread safety, concurrent allocation, heap shrinking, returning pages
//! to the host OS, leak-tracking metadata, and advanced placement
//! policies (segregated lists, best-fit, buddy systems) are all out of
//! scope - this is intentionally a first-fit implicit-list baseline, not
//! a production allocator design.
//!
//! ## Safety
//!
//! [`heap::HeapManager::alloc`] is safe to call - it either returns a
//! valid, appropriately-sized, appropriately-aligned pointer or `None`.
//! [`heap::HeapManager::free`] is `unsafe`: passing a pointer not
//! currently allocated by this same heap is undefined behavior, and the
//! allocator performs no detection of that misuse.

pub mod capi;
pub mod check;
pub mod config;
pub mod error;
pub mod heap;
pub mod mem;
pub mod tag;

pub use config::HeapConfig;
pub use error::AllocError;
pub use heap::HeapManager;
pub use mem::MemorySim;
