//! Boundary-tag accessors: pack/unpack a block's size-and-allocated word,
//! and step between a block's header, footer, and neighbors.
//!
//! These are implementation conveniences over a byte buffer, not part of
//! the crate's public interface - they operate on raw `*mut u8` "block
//! pointers", one word (`WSIZE` bytes) at a time.
//!
//! A block pointer `bp` always points at the first byte of a block's
//! payload (or, for a free block, the first byte after its header),
//! never at the header itself.

use crate::config::{DSIZE, WSIZE};

/// Packs a block size and allocation bit into a single header/footer word.
///
/// `size` is always a multiple of 8, so its low 3 bits are free for flags;
/// only the low bit is used here.
#[inline]
pub const fn pack(size: usize, alloc: bool) -> u32 {
  (size as u32) | (alloc as u32)
}

/// Extracts the size field from a packed header/footer word.
#[inline]
pub const fn get_size(word: u32) -> usize {
  (word & !0x7) as usize
}

/// Extracts the allocation bit from a packed header/footer word.
#[inline]
pub const fn get_alloc(word: u32) -> bool {
  (word & 0x1) != 0
}

/// Reads the word at a raw address.
///
/// # Safety
/// `addr` must be valid for a 4-byte aligned read within the backing store.
#[inline]
pub unsafe fn get(addr: *const u8) -> u32 {
  unsafe { (addr as *const u32).read_unaligned() }
}

/// Writes a word at a raw address.
///
/// # Safety
/// `addr` must be valid for a 4-byte write within the backing store.
#[inline]
pub unsafe fn put(addr: *mut u8, val: u32) {
  unsafe { (addr as *mut u32).write_unaligned(val) }
}

/// Address of a block's header, one word before its block pointer.
///
/// # Safety
/// `bp` must point into the backing store with at least `WSIZE` bytes of
/// valid memory before it.
#[inline]
pub unsafe fn hdrp(bp: *mut u8) -> *mut u8 {
  unsafe { bp.sub(WSIZE) }
}

/// Address of a block's footer, derived from its header's size field.
///
/// # Safety
/// `bp` must be a valid block pointer whose header is already written.
#[inline]
pub unsafe fn ftrp(bp: *mut u8) -> *mut u8 {
  unsafe {
    let size = get_size(get(hdrp(bp)));
    bp.add(size).sub(DSIZE)
  }
}

/// Block pointer of the block immediately following `bp` in address order.
///
/// # Safety
/// `bp`'s header must be valid, and the following block must exist (i.e.
/// `bp` must not be the epilogue).
#[inline]
pub unsafe fn next_blkp(bp: *mut u8) -> *mut u8 {
  unsafe {
    let size = get_size(get(hdrp(bp)));
    bp.add(size)
  }
}

/// Block pointer of the block immediately preceding `bp` in address order,
/// found via the footer-of-predecessor trick.
///
/// # Safety
/// `bp`'s predecessor's footer must be valid, and a predecessor must exist
/// (i.e. `bp` must not be the first block after the prologue).
#[inline]
pub unsafe fn prev_blkp(bp: *mut u8) -> *mut u8 {
  unsafe {
    let prev_size = get_size(get(bp.sub(DSIZE)));
    bp.sub(prev_size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pack_and_unpack_roundtrip() {
    for size in (16..=4096usize).step_by(8) {
      for alloc in [true, false] {
        let word = pack(size, alloc);
        assert_eq!(get_size(word), size);
        assert_eq!(get_alloc(word), alloc);
      }
    }
  }

  #[test]
  fn pack_low_bits_carry_only_the_flag() {
    let word = pack(24, true);
    assert_eq!(word, 25);
    let word = pack(24, false);
    assert_eq!(word, 24);
  }

  #[test]
  fn get_put_roundtrip_on_a_buffer() {
    let mut buf = [0u8; 16];
    let p = buf.as_mut_ptr();
    unsafe {
      put(p, pack(16, true));
      assert_eq!(get(p), pack(16, true));
    }
  }

  #[test]
  fn hdrp_ftrp_next_prev_are_consistent_for_one_block() {
    // Lay out a single 24-byte block by hand: header, 16-byte
    // payload, footer.
    let mut buf = [0u8; 24 + 2 * WSIZE];
    let base = buf.as_mut_ptr();
    unsafe {
      let bp = base.add(WSIZE);
      put(hdrp(bp), pack(24, true));
      put(ftrp(bp), pack(24, true));

      assert_eq!(hdrp(bp), base);
      assert_eq!(ftrp(bp), bp.add(24 - DSIZE));
      assert_eq!(next_blkp(bp), bp.add(24));
      assert_eq!(prev_blkp(next_blkp(bp)), bp);
    }
  }
}
