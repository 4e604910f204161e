//! MetroHash with a 128-bit digest.
//!
//! Two accumulators carry through the tail cascade; the other two only
//! exist while full blocks are being absorbed.  The digest is `v0` in the
//! low half and `v1` in the high half, which is also its little-endian byte
//! layout.

use super::{absorb_block, absorb_block_crc, fold_lanes, read_block, K_A, K_B, K_C};
use crate::crc::Crc32c;
use crate::words::read_le;

pub const DIGEST_SIZE_BYTES: usize = 128 / 8;

/// Constants and rotations for one 128-bit configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub k: [u64; 4],
    /// Rotations of the four post-block fold steps.
    pub fold: [u32; 4],
    /// Lane rotation applied after absorbing a tail word multiplicatively,
    /// for the 16-byte step and for the 8-byte (and smaller) steps.
    pub lane_rot: [u32; 2],
    /// Cross rotations of the 16, 8, 4, 2 and 1 byte tail steps.
    pub cross_rot: [u32; 5],
    /// Rotations of the final rounds.
    pub final_rot: [u32; 2],
    /// Multipliers of the four final rounds.
    pub final_mul: [u64; 4],
}

pub const V1: Params = Params {
    k: K_A,
    fold: [26, 26, 26, 30],
    lane_rot: [33, 33],
    cross_rot: [17, 20, 18, 24, 24],
    final_rot: [13, 37],
    final_mul: K_A,
};

pub const V2: Params = Params {
    k: K_B,
    fold: [33, 33, 33, 33],
    lane_rot: [29, 29],
    cross_rot: [29, 29, 25, 30, 18],
    final_rot: [33, 33],
    final_mul: K_B,
};

pub const CRC_V1: Params = Params {
    k: K_A,
    fold: [34, 37, 34, 37],
    lane_rot: [34, 36],
    cross_rot: [30, 23, 19, 13, 17],
    final_rot: [11, 26],
    final_mul: [K_A[0], K_A[1], K_A[0], K_A[1]],
};

pub const CRC_V2: Params = Params {
    k: K_C,
    fold: [12, 19, 12, 19],
    lane_rot: [41, 34],
    cross_rot: [10, 22, 14, 15, 18],
    final_rot: [15, 27],
    final_mul: [K_C[0], K_C[1], K_C[0], K_C[1]],
};

/// Hashes `bytes` with multiplicative absorption.
pub fn hash(params: &Params, seed: u64, bytes: &[u8]) -> u128 {
    run(params, seed, bytes, None::<&crate::crc::Castagnoli>)
}

/// Hashes `bytes` with the block loop and the 4/2/1 byte tail steps driven
/// by `crc`.
pub fn hash_crc<C: Crc32c + ?Sized>(params: &Params, crc: &C, seed: u64, bytes: &[u8]) -> u128 {
    run(params, seed, bytes, Some(crc))
}

#[inline(always)]
fn run<C: Crc32c + ?Sized>(p: &Params, seed: u64, bytes: &[u8], crc: Option<&C>) -> u128 {
    let [k0, k1, k2, k3] = p.k;
    let seed = seed as u32 as u64;
    let len = bytes.len() as u64;

    let mut v = [
        seed.wrapping_sub(k0).wrapping_mul(k3).wrapping_add(len),
        seed.wrapping_add(k1).wrapping_mul(k2).wrapping_add(len),
        0,
        0,
    ];

    let mut blocks = bytes.chunks_exact(super::BLOCK_SIZE);
    if bytes.len() >= super::BLOCK_SIZE {
        v[2] = seed.wrapping_add(k0).wrapping_mul(k2).wrapping_add(len);
        v[3] = seed.wrapping_sub(k1).wrapping_mul(k3).wrapping_add(len);
        for block in &mut blocks {
            let words = read_block(block);
            match crc {
                Some(crc) => absorb_block_crc(&mut v, words, crc),
                None => absorb_block(&mut v, words, &p.k),
            }
        }
        fold_lanes(&mut v, &p.k, p.fold);
    }

    let [mut v0, mut v1, ..] = v;
    let mut tail = blocks.remainder();

    // Scales a word into a lane: add, rotate, multiply.
    let absorb = |lane: u64, word: u64, rot: u32| -> u64 {
        lane.wrapping_add(word.wrapping_mul(k2))
            .rotate_right(rot)
            .wrapping_mul(k3)
    };
    // Cross mixes, one per lane.
    let cross0 = |v0: u64, v1: u64, rot: u32| -> u64 {
        v0 ^ v0.wrapping_mul(k2).wrapping_add(v1).rotate_right(rot).wrapping_mul(k1)
    };
    let cross1 = |v1: u64, v0: u64, rot: u32| -> u64 {
        v1 ^ v1.wrapping_mul(k3).wrapping_add(v0).rotate_right(rot).wrapping_mul(k0)
    };

    if tail.len() >= 16 {
        v0 = absorb(v0, read_le(&tail[0..8]), p.lane_rot[0]);
        v1 = absorb(v1, read_le(&tail[8..16]), p.lane_rot[0]);
        v0 = cross0(v0, v1, p.cross_rot[0]);
        v1 = cross1(v1, v0, p.cross_rot[0]);
        tail = &tail[16..];
    }

    if tail.len() >= 8 {
        v0 = absorb(v0, read_le(&tail[..8]), p.lane_rot[1]);
        v0 = cross0(v0, v1, p.cross_rot[1]);
        tail = &tail[8..];
    }

    // The remaining steps alternate lanes, starting with v1.  Under CRC the
    // word is folded into the CRC of the other lane instead of being scaled.
    if tail.len() >= 4 {
        let word = read_le(&tail[..4]);
        v1 = match crc {
            Some(crc) => v1 ^ crc.update_u64(v0 as u32, word) as u64,
            None => absorb(v1, word, p.lane_rot[1]),
        };
        v1 = cross1(v1, v0, p.cross_rot[2]);
        tail = &tail[4..];
    }

    if tail.len() >= 2 {
        let word = read_le(&tail[..2]);
        v0 = match crc {
            Some(crc) => v0 ^ crc.update_u64(v1 as u32, word) as u64,
            None => absorb(v0, word, p.lane_rot[1]),
        };
        v0 = cross0(v0, v1, p.cross_rot[3]);
        tail = &tail[2..];
    }

    if let &[byte] = tail {
        let word = byte as u64;
        v1 = match crc {
            Some(crc) => v1 ^ crc.update_u64(v0 as u32, word) as u64,
            None => absorb(v1, word, p.lane_rot[1]),
        };
        v1 = cross1(v1, v0, p.cross_rot[4]);
    }

    let [m0, m1, m2, m3] = p.final_mul;
    let [r0, r1] = p.final_rot;
    v0 = v0.wrapping_add(v0.wrapping_mul(m0).wrapping_add(v1).rotate_right(r0));
    v1 = v1.wrapping_add(v1.wrapping_mul(m1).wrapping_add(v0).rotate_right(r1));
    v0 = v0.wrapping_add(v0.wrapping_mul(m2).wrapping_add(v1).rotate_right(r0));
    v1 = v1.wrapping_add(v1.wrapping_mul(m3).wrapping_add(v0).rotate_right(r1));

    (v0 as u128) | ((v1 as u128) << 64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crc::Castagnoli;

    const KEY: &[u8] = b"012345678901234567890123456789012345678901234567890123456789012";

    #[test]
    fn reference_key() {
        assert_eq!(
            hash(&V1, 0, KEY).to_le_bytes(),
            [
                0xED, 0x99, 0x97, 0xED, 0x9D, 0x0A, 0x8B, 0x0F, 0xF3, 0xF2, 0x66, 0x39, 0x94,
                0x77, 0x78, 0x8F
            ]
        );
        assert_eq!(hash(&V1, 1, KEY), 0xf4d1cfecabbef6fd5e75def767baa6dd);
        assert_eq!(hash(&V2, 0, KEY), 0xab595350f3ed0755d435cf19e16fba7b);
        assert_eq!(hash(&V2, 1, KEY), 0xf09ed64608db092bc1db5c9a14afa62d);
    }

    #[test]
    fn reference_key_crc() {
        assert_eq!(hash_crc(&CRC_V1, &Castagnoli, 0, KEY), 0x2f26d876484eacdfd304168367ed29b3);
        assert_eq!(hash_crc(&CRC_V1, &Castagnoli, 1, KEY), 0xf26d27d4570a0db1a7189ff11ab5fae8);
        assert_eq!(hash_crc(&CRC_V2, &Castagnoli, 0, KEY), 0x5326efbba6bc6b2077bd7b257ea60205);
        assert_eq!(hash_crc(&CRC_V2, &Castagnoli, 1, KEY), 0x19bc9256d9502cb064cfa08171f8542d);
    }

    #[test]
    fn halves_are_both_mixed() {
        let a = hash(&V1, 0, b"a");
        let b = hash(&V1, 0, b"b");
        assert_ne!(a as u64, b as u64);
        assert_ne!((a >> 64) as u64, (b >> 64) as u64);
    }

    #[test]
    fn block_boundary_skips_tail() {
        // Exactly one block leaves an empty tail; one byte either side takes
        // a different path.
        let first = hash(&V1, 3, &KEY[..32]);
        assert_eq!(first, 0x896ee588202fc874e1e52baec29872e4);
        assert_ne!(first, hash(&V1, 3, &KEY[..33]));
        assert_ne!(first, hash(&V1, 3, &KEY[..31]));
    }
}
