//! The CRC-32C ingredient used by the CRC-accelerated MetroHash variants.
//!
//! The engines only ever need one operation: fold a 64-bit little-endian word
//! into a running CRC register, with no pre- or post-inversion.  That is the
//! behavior of the SSE4.2 `crc32` instruction on a 64-bit operand, which the
//! reference digests were produced with.

/// Raw CRC-32C register update.
pub trait Crc32c {
    /// Folds the 8 little-endian bytes of `word` into `crc`.
    fn update_u64(&self, crc: u32, word: u64) -> u32;
}

/// The default CRC-32C implementation, backed by the `crc32c` crate (which
/// uses hardware acceleration where it can).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Castagnoli;

impl Crc32c for Castagnoli {
    #[inline]
    fn update_u64(&self, crc: u32, word: u64) -> u32 {
        // `crc32c_append` works on finalized values, so undo its inversions.
        !crc32c::crc32c_append(!crc, &word.to_le_bytes())
    }
}

impl<C: Crc32c + ?Sized> Crc32c for &C {
    #[inline]
    fn update_u64(&self, crc: u32, word: u64) -> u32 {
        (**self).update_u64(crc, word)
    }
}
