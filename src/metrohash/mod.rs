//! The MetroHash family.
//!
//! All eight configurations share one skeleton: seed the accumulators,
//! absorb 32-byte blocks, absorb a 0-31 byte tail through a 16/8/4/2/1 byte
//! cascade, then run the finalization rounds.  What differs between them is
//! captured by the parameter tables in this module, and by whether words are
//! absorbed multiplicatively or through a CRC-32C register.

pub mod metro128;
pub mod metro64;

use crate::words::read_le;

/// Bytes consumed per iteration of the block loop.
pub const BLOCK_SIZE: usize = 32;

/// Rotation applied to every block-loop lane.  Shared by all variants.
const BLOCK_ROTATION: u32 = 29;

/// The first constant set, used by variant 1.
const K_A: [u64; 4] = [0xC83A91E1, 0x8648DBDB, 0x7BDEC03B, 0x2F5870A5];

/// The second constant set, used by variant 2.
const K_B: [u64; 4] = [0xD6D018F5, 0xA2AA033B, 0x62992FC1, 0x30BC5B29];

/// The third constant set, only used by the 128-bit CRC variant 2.
const K_C: [u64; 4] = [0xEE783E2F, 0xAD07C493, 0x797A90BB, 0x2E4B2E1B];

/// Reads the four words of one block.
#[inline(always)]
pub(crate) fn read_block(block: &[u8]) -> [u64; 4] {
    [
        read_le(&block[0..8]),
        read_le(&block[8..16]),
        read_le(&block[16..24]),
        read_le(&block[24..32]),
    ]
}

/// Multiplicative block absorption shared by the plain 64 and 128-bit
/// variants.  Each lane is rotated and then picks up its partner two lanes
/// over, which has already been updated for lanes 2 and 3.
#[inline(always)]
pub(crate) fn absorb_block(v: &mut [u64; 4], words: [u64; 4], k: &[u64; 4]) {
    for i in 0..4 {
        v[i] = v[i].wrapping_add(words[i].wrapping_mul(k[i]));
        v[i] = v[i]
            .rotate_right(BLOCK_ROTATION)
            .wrapping_add(v[(i + 2) % 4]);
    }
}

/// CRC block absorption shared by the CRC 64 and 128-bit variants.
#[inline(always)]
pub(crate) fn absorb_block_crc<C: crate::crc::Crc32c + ?Sized>(
    v: &mut [u64; 4],
    words: [u64; 4],
    crc: &C,
) {
    for i in 0..4 {
        v[i] ^= crc.update_u64(v[i] as u32, words[i]) as u64;
    }
}

/// Folds the four block accumulators into each other after the block loop.
///
/// The order of the four steps is fixed; `rot` gives each step's rotation.
#[inline(always)]
pub(crate) fn fold_lanes(v: &mut [u64; 4], k: &[u64; 4], rot: [u32; 4]) {
    let [k0, k1, ..] = *k;
    v[2] ^= ((v[0].wrapping_add(v[3])).wrapping_mul(k0).wrapping_add(v[1]))
        .rotate_right(rot[0])
        .wrapping_mul(k1);
    v[3] ^= ((v[1].wrapping_add(v[2])).wrapping_mul(k1).wrapping_add(v[0]))
        .rotate_right(rot[1])
        .wrapping_mul(k0);
    v[0] ^= ((v[0].wrapping_add(v[2])).wrapping_mul(k0).wrapping_add(v[3]))
        .rotate_right(rot[2])
        .wrapping_mul(k1);
    v[1] ^= ((v[1].wrapping_add(v[3])).wrapping_mul(k1).wrapping_add(v[2]))
        .rotate_right(rot[3])
        .wrapping_mul(k0);
}
