//! MetroHash with a 64-bit digest.

use super::{absorb_block, absorb_block_crc, fold_lanes, read_block, K_A, K_B};
use crate::crc::Crc32c;
use crate::words::read_le;

pub const DIGEST_SIZE_BYTES: usize = 64 / 8;

/// Constants and rotations for one 64-bit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub k: [u64; 4],
    /// Rotation used by all four steps of the post-block fold.
    pub fold: u32,
    /// Multipliers applied to the two words of a 16-byte tail: the first
    /// scales the input word, the second follows the lane rotation.
    pub tail16_mul: [[u64; 2]; 2],
    /// Lane rotation and cross rotation of the 16-byte tail.
    pub tail16_rot: [u32; 2],
    /// Rotations of the 8, 4, 2 and 1 byte tail steps.
    pub tail_rot: [u32; 4],
    /// Rotations of the two final avalanche steps.
    pub final_rot: [u32; 2],
}

pub const V1: Params = Params {
    k: K_A,
    fold: 33,
    tail16_mul: [[K_A[0], K_A[1]], [K_A[1], K_A[2]]],
    tail16_rot: [33, 35],
    tail_rot: [33, 15, 13, 25],
    final_rot: [33, 33],
};

pub const V2: Params = Params {
    k: K_B,
    fold: 30,
    tail16_mul: [[K_B[2], K_B[3]], [K_B[2], K_B[3]]],
    tail16_rot: [29, 34],
    tail_rot: [36, 15, 15, 23],
    final_rot: [28, 29],
};

/// The CRC variant 1 keeps the variant 1 schedule.
pub const CRC_V1: Params = V1;

/// The CRC variant 2 runs the variant 1 schedule over the second constant set.
pub const CRC_V2: Params = Params {
    k: K_B,
    tail16_mul: [[K_B[0], K_B[1]], [K_B[1], K_B[2]]],
    ..V1
};

/// Hashes `bytes` with multiplicative absorption.
pub fn hash(params: &Params, seed: u64, bytes: &[u8]) -> u64 {
    run(params, seed, bytes, None::<&crate::crc::Castagnoli>)
}

/// Hashes `bytes` with the block loop and the 4/2/1 byte tail steps driven
/// by `crc`.
pub fn hash_crc<C: Crc32c + ?Sized>(params: &Params, crc: &C, seed: u64, bytes: &[u8]) -> u64 {
    run(params, seed, bytes, Some(crc))
}

#[inline(always)]
fn run<C: Crc32c + ?Sized>(p: &Params, seed: u64, bytes: &[u8], crc: Option<&C>) -> u64 {
    let [k0, k1, k2, k3] = p.k;
    // The reference algorithm takes a 32-bit seed.
    let seed = seed as u32 as u64;

    let mut hash = seed
        .wrapping_add(k2)
        .wrapping_mul(k0)
        .wrapping_add(bytes.len() as u64);

    let mut blocks = bytes.chunks_exact(super::BLOCK_SIZE);
    if bytes.len() >= super::BLOCK_SIZE {
        let mut v = [hash; 4];
        for block in &mut blocks {
            let words = read_block(block);
            match crc {
                Some(crc) => absorb_block_crc(&mut v, words, crc),
                None => absorb_block(&mut v, words, &p.k),
            }
        }
        fold_lanes(&mut v, &p.k, [p.fold; 4]);
        hash = hash.wrapping_add(v[0] ^ v[1]);
    }

    let mut tail = blocks.remainder();

    if tail.len() >= 16 {
        let [r_lane, r_cross] = p.tail16_rot;
        let [m0, m1] = p.tail16_mul;
        let mut v0 = hash.wrapping_add(read_le(&tail[0..8]).wrapping_mul(m0[0]));
        v0 = v0.rotate_right(r_lane).wrapping_mul(m0[1]);
        let mut v1 = hash.wrapping_add(read_le(&tail[8..16]).wrapping_mul(m1[0]));
        v1 = v1.rotate_right(r_lane).wrapping_mul(m1[1]);
        v0 ^= v0.wrapping_mul(k0).rotate_right(r_cross).wrapping_add(v1);
        v1 ^= v1.wrapping_mul(k3).rotate_right(r_cross).wrapping_add(v0);
        hash = hash.wrapping_add(v1);
        tail = &tail[16..];
    }

    if tail.len() >= 8 {
        hash = hash.wrapping_add(read_le(&tail[..8]).wrapping_mul(k3));
        hash ^= hash.rotate_right(p.tail_rot[0]).wrapping_mul(k1);
        tail = &tail[8..];
    }

    for (width, rot) in [(4, p.tail_rot[1]), (2, p.tail_rot[2]), (1, p.tail_rot[3])] {
        if tail.len() >= width {
            let word = read_le(&tail[..width]);
            match crc {
                Some(crc) => hash ^= crc.update_u64(hash as u32, word) as u64,
                None => hash = hash.wrapping_add(word.wrapping_mul(k3)),
            }
            hash ^= hash.rotate_right(rot).wrapping_mul(k1);
            tail = &tail[width..];
        }
    }
    debug_assert!(tail.is_empty());

    hash ^= hash.rotate_right(p.final_rot[0]);
    hash = hash.wrapping_mul(k0);
    hash ^= hash.rotate_right(p.final_rot[1]);
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::Castagnoli;

    // 63 bytes: one block, then every tail step once.
    const KEY: &[u8] = b"012345678901234567890123456789012345678901234567890123456789012";

    #[test]
    fn reference_key() {
        assert_eq!(hash(&V1, 0, KEY).to_le_bytes(), [0x65, 0x8F, 0x04, 0x4F, 0x5C, 0x73, 0x0E, 0x40]);
        assert_eq!(hash(&V1, 1, KEY).to_le_bytes(), [0xAE, 0x49, 0xEB, 0xB0, 0xA8, 0x56, 0x53, 0x7B]);
        assert_eq!(hash(&V2, 0, KEY), 0x11326260b9aa3c07);
        assert_eq!(hash(&V2, 1, KEY), 0xc00284f59c8e51cf);
    }

    #[test]
    fn reference_key_crc() {
        assert_eq!(hash_crc(&CRC_V1, &Castagnoli, 0, KEY), 0x80f5568ef72d6ac0);
        assert_eq!(hash_crc(&CRC_V1, &Castagnoli, 1, KEY), 0x314053cd47b19fad);
        assert_eq!(hash_crc(&CRC_V2, &Castagnoli, 0, KEY), 0x353e55edd4b3ac2b);
        assert_eq!(hash_crc(&CRC_V2, &Castagnoli, 1, KEY), 0x8c37131f5b0f0753);
    }

    #[test]
    fn only_low_seed_bits_matter() {
        let seed = 0x1234_5678_9abc_def0;
        assert_eq!(hash(&V1, seed, KEY), hash(&V1, seed & 0xffff_ffff, KEY));
        assert_ne!(hash(&V1, seed, KEY), hash(&V1, seed + 1, KEY));
    }

    #[test]
    fn crc_only_touches_blocks_and_short_tails() {
        // 8 and 16-byte inputs never reach a CRC step.
        for len in [0, 8, 16, 24] {
            let data = &KEY[..len];
            assert_eq!(hash(&V1, 7, data), hash_crc(&CRC_V1, &Castagnoli, 7, data));
        }
        for len in [1, 2, 4, 32] {
            let data = &KEY[..len];
            assert_ne!(hash(&V1, 7, data), hash_crc(&CRC_V1, &Castagnoli, 7, data));
        }
    }

    #[test]
    fn every_tail_byte_counts() {
        for len in 1..=KEY.len() {
            let mut data = KEY[..len].to_vec();
            let before = hash(&V2, 0, &data);
            data[len - 1] ^= 0x80;
            assert_ne!(before, hash(&V2, 0, &data), "len {len}");
        }
    }
}
