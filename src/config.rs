//! Compile-time-ish configuration constants and the overridable [`HeapConfig`]
//! surface.

use crate::error::AllocError;

/// Size of a word: the unit boundary tags are packed into.
pub const WSIZE: usize = 4;

/// Size of a double-word: the alignment unit for payload addresses.
pub const DSIZE: usize = 8;

/// Default heap-extension granularity, 4 KiB.
pub const CHUNK: usize = 1 << 12;

/// Default backing-store capacity, 20 MiB.
pub const MAX_HEAP: usize = 20 * (1 << 20);

/// Minimum block size: header + footer + nothing else.
pub const MIN_BLOCK_SIZE: usize = 2 * DSIZE;

/// Tunable knobs for a [`crate::heap::HeapManager`] instance, threaded
/// through one small, validated struct instead of scattering magic numbers
/// through the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  /// Payload alignment in bytes. Must be 4 or 8.
  pub alignment: usize,
  /// Total capacity of the simulated backing store, in bytes.
  pub max_heap: usize,
  /// Default heap-extension granularity, in bytes.
  pub chunk: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      alignment: DSIZE,
      max_heap: MAX_HEAP,
      chunk: CHUNK,
    }
  }
}

impl HeapConfig {
  /// Validates that this configuration can back a heap manager.
  pub fn validate(&self) -> Result<(), AllocError> {
    if self.alignment != 4 && self.alignment != 8 {
      return Err(AllocError::InvalidConfig {
        reason: "alignment must be 4 or 8",
      });
    }
    if self.max_heap < self.chunk {
      return Err(AllocError::InvalidConfig {
        reason: "max_heap must be at least one chunk",
      });
    }
    if self.chunk % DSIZE != 0 {
      return Err(AllocError::InvalidConfig {
        reason: "chunk must be a multiple of the double-word size",
      });
    }
    Ok(())
  }
}
