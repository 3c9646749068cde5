//! Error types for the simulated heap allocator.
//!
//! Exactly two failure modes are ever surfaced through a typed error: the
//! backing store running out of room to grow, and a caller trying to use a
//! heap that was never initialized. Everything else, `alloc(0)`, a
//! double-free, a foreign pointer passed to `free`, is either defined
//! behavior (returns `None`/null, not an error) or undefined behavior the
//! allocator makes no attempt to detect.

use thiserror::Error;

/// Failure modes for [`crate::mem::MemorySim`] and [`crate::heap::HeapManager`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocError {
  /// The backing store could not grow by the requested number of bytes.
  #[error("backing store exhausted: requested {requested} bytes, {available} available")]
  OutOfMemory { requested: usize, available: usize },

  /// A configuration value was out of the supported range.
  #[error("invalid heap configuration: {reason}")]
  InvalidConfig { reason: &'static str },

  /// An operation was attempted before `init` completed successfully.
  #[error("heap manager used before init() completed")]
  NotInitialized,
}
