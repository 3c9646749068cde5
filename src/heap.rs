//! The heap manager: a boundary-tagged implicit free list, first-fit
//! placement, immediate coalescing.
//!
//! This is the core the rest of the crate exists to serve. A `HeapManager`
//! owns its `MemorySim` and the single pointer (`heap_listp`, the address
//! of the prologue's footer), kept as instance state rather than a global
//! so that independent heaps can coexist.

use log::{debug, trace};

use crate::config::{DSIZE, HeapConfig, MIN_BLOCK_SIZE, WSIZE};
use crate::error::AllocError;
use crate::mem::MemorySim;
use crate::tag::{ftrp, get, get_alloc, get_size, hdrp, next_blkp, pack, prev_blkp, put};

/// A boundary-tagged implicit-free-list heap, backed by a [`MemorySim`].
pub struct HeapManager {
  mem: MemorySim,
  config: HeapConfig,
  /// Address of the prologue's footer - one word past the prologue's
  /// header, and the starting point for every `find_fit` walk.
  heap_listp: *mut u8,
}

impl HeapManager {
  /// Builds the heap layout (padding, prologue, epilogue) and seeds it
  /// with one `config.chunk`-sized free block.
  ///
  /// Pre-condition: none beyond `config` being valid - this constructs
  /// its own `MemorySim` internally, so the backing store is always
  /// freshly initialized and empty by construction.
  pub fn init(config: HeapConfig) -> Result<Self, AllocError> {
    config.validate()?;
    let mut mem = MemorySim::init(config.max_heap);

    // Padding word + prologue header + prologue footer + epilogue header.
    let base = mem.sbrk(4 * WSIZE as isize)?;
    let heap_listp = unsafe {
      // Padding word: left as zero, never read.
      put(base, 0);
      // Prologue: an allocated block with no payload.
      put(base.add(WSIZE), pack(DSIZE, true));
      put(base.add(2 * WSIZE), pack(DSIZE, true));
      // Epilogue: zero-size, allocated, header only.
      put(base.add(3 * WSIZE), pack(0, true));
      base.add(2 * WSIZE)
    };

    let mut manager = Self {
      mem,
      config,
      heap_listp,
    };
    manager.extend_heap(config.chunk / WSIZE)?;
    debug!(
      "heap initialized: chunk={} max_heap={}",
      config.chunk, config.max_heap
    );
    Ok(manager)
  }

  /// Builds a heap using the default configuration.
  pub fn init_default() -> Result<Self, AllocError> {
    Self::init(HeapConfig::default())
  }

  /// Allocates a payload of at least `size` usable bytes, 8-byte aligned.
  ///
  /// Returns `None` for `size == 0` or when no fit exists and the
  /// backing store cannot grow enough to make one.
  pub fn alloc(&mut self, size: usize) -> Option<*mut u8> {
    if size == 0 {
      return None;
    }

    let asize = Self::adjust_size(size);
    if asize > self.config.max_heap {
      // Could never fit even after maximal extension, so fail fast
      // rather than attempt a doomed extension.
      return None;
    }

    let bp = if let Some(bp) = self.find_fit(asize) {
      bp
    } else {
      let extend_size = asize.max(self.config.chunk);
      self.extend_heap(extend_size / WSIZE).ok()?
    };

    self.place(bp, asize);
    debug!("alloc({size}) -> {bp:?} (asize={asize})");
    Some(bp)
  }

  /// Marks `bp`'s block free and immediately coalesces with free
  /// neighbors.
  ///
  /// # Safety
  /// `bp` must be a pointer previously returned by [`HeapManager::alloc`]
  /// on this same heap, not yet freed. Passing anything else is
  /// undefined behavior - this function performs no policing.
  pub unsafe fn free(&mut self, bp: *mut u8) {
    if bp.is_null() {
      // Freeing null is a no-op.
      return;
    }

    unsafe {
      let size = get_size(get(hdrp(bp)));
      put(hdrp(bp), pack(size, false));
      put(ftrp(bp), pack(size, false));
      debug!("free({bp:?}) size={size}");
      self.coalesce(bp);
    }
  }

  /// Adjusts a requested payload size into a block size that has room
  /// for header, footer, and double-word alignment.
  fn adjust_size(size: usize) -> usize {
    if size <= DSIZE {
      MIN_BLOCK_SIZE
    } else {
      DSIZE * ((size + DSIZE + (DSIZE - 1)) / DSIZE)
    }
  }

  /// First-fit search of the implicit free list.
  fn find_fit(&self, asize: usize) -> Option<*mut u8> {
    unsafe {
      let mut bp = self.heap_listp;
      loop {
        let header = get(hdrp(bp));
        let block_size = get_size(header);
        if block_size == 0 {
          // Reached the epilogue.
          return None;
        }
        if !get_alloc(header) && block_size >= asize {
          return Some(bp);
        }
        bp = next_blkp(bp);
      }
    }
  }

  /// Places a block of `asize` bytes at the start of a free block `bp`,
  /// splitting off the remainder when it would still meet the minimum
  /// block size.
  fn place(&mut self, bp: *mut u8, asize: usize) {
    unsafe {
      let csize = get_size(get(hdrp(bp)));
      if csize - asize >= MIN_BLOCK_SIZE {
        put(hdrp(bp), pack(asize, true));
        put(ftrp(bp), pack(asize, true));
        let remainder = next_blkp(bp);
        put(hdrp(remainder), pack(csize - asize, false));
        put(ftrp(remainder), pack(csize - asize, false));
      } else {
        put(hdrp(bp), pack(csize, true));
        put(ftrp(bp), pack(csize, true));
      }
    }
  }

  /// Requests more space from the backing store, converts it into one
  /// free block, rewrites the epilogue, and coalesces with the
  /// previously-last block if it was free.
  fn extend_heap(&mut self, words: usize) -> Result<*mut u8, AllocError> {
    let size = if words % 2 != 0 {
      (words + 1) * WSIZE
    } else {
      words * WSIZE
    };

    let raw = self.mem.sbrk(size as isize)?;
    trace!("extend_heap: +{size} bytes at {raw:?}");

    unsafe {
      // `raw` is the address immediately following the old epilogue
      // header, which becomes this new block's header.
      put(hdrp(raw), pack(size, false));
      put(ftrp(raw), pack(size, false));
      put(hdrp(next_blkp(raw)), pack(0, true));

      Ok(self.coalesce(raw))
    }
  }

  /// Merges a just-freed (or just-extended) block with any free
  /// neighbors: one of four cases, depending on whether the previous
  /// and next blocks are themselves allocated or free.
  ///
  /// # Safety
  /// `bp`'s header/footer, and those of its immediate neighbors, must
  /// already be valid and up to date.
  unsafe fn coalesce(&mut self, bp: *mut u8) -> *mut u8 {
    unsafe {
      // The word at `bp - DSIZE` is the predecessor's footer; reading
      // it here mirrors the `GET_ALLOC(FTRP(PREV_BLKP(bp)))` lookup
      // without walking to the predecessor twice.
      let prev_alloc = get_alloc(get(bp.sub(DSIZE)));
      let next_alloc = get_alloc(get(hdrp(next_blkp(bp))));
      let mut size = get_size(get(hdrp(bp)));

      match (prev_alloc, next_alloc) {
        (true, true) => bp,
        (true, false) => {
          size += get_size(get(hdrp(next_blkp(bp))));
          put(hdrp(bp), pack(size, false));
          put(ftrp(bp), pack(size, false));
          bp
        }
        (false, true) => {
          size += get_size(get(hdrp(prev_blkp(bp))));
          put(ftrp(bp), pack(size, false));
          put(hdrp(prev_blkp(bp)), pack(size, false));
          prev_blkp(bp)
        }
        (false, false) => {
          size += get_size(get(hdrp(prev_blkp(bp)))) + get_size(get(ftrp(next_blkp(bp))));
          let prev = prev_blkp(bp);
          let next = next_blkp(bp);
          put(hdrp(prev), pack(size, false));
          put(ftrp(next), pack(size, false));
          prev
        }
      }
    }
  }

  /// The address of the prologue's footer - anchors free-list traversal.
  /// Exposed for diagnostics (`crate::check`) only.
  pub fn heap_listp(&self) -> *mut u8 {
    self.heap_listp
  }

  /// The backing store this heap is built on. Exposed for diagnostics.
  pub fn mem(&self) -> &MemorySim {
    &self.mem
  }

  /// The configuration this heap was built with.
  pub fn config(&self) -> &HeapConfig {
    &self.config
  }
}
