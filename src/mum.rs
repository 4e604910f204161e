//! MUM hash: multiply-and-mix over 8-byte words.
//!
//! Every round goes through [`mum`], the full 64x64->128 product of a word and
//! an odd constant, folded back to 64 bits by adding its two halves.

use crate::words::read_le;

pub const DIGEST_SIZE_BYTES: usize = 64 / 8;

/// Bytes per input word.
pub const WORD_SIZE: usize = 8;

/// Words consumed per unrolled block.  This is the target-independent
/// setting, so digests do not depend on the host architecture.
const UNROLL_FACTOR: usize = 4;

const BLOCK_START_PRIME: u64 = 0xc42b5e2e6480b23b;
const UNROLL_PRIME: u64 = 0x7b51ec3d22f7096f;
const TAIL_PRIME: u64 = 0xaf47d47c99b1461b;
const FINISH_PRIME_1: u64 = 0xa9a7ae7ceff79f3f;
const FINISH_PRIME_2: u64 = 0xaf47d47c99b1461b;

/// Per-word mixing constants, indexed by the word's position in its block.
const PRIMES: [u64; 16] = [
    0x9ebdcae10d981691,
    0x32b9b9b97a27ac7d,
    0x29b5584d83d35bbd,
    0x4b04e0e61401255f,
    0x25e8f7b1f1c9d027,
    0x80d4c8c000f3e881,
    0xbd1255431904b9dd,
    0x8a3bd4485eee6d81,
    0x3bc721b2aad05197,
    0x71b1a19b907d6e33,
    0x525e6c1084a8534b,
    0x9e4c2cd340c1299f,
    0xde3add92e94caa37,
    0x7e14eadb1f65311d,
    0x3f5aa40f89812853,
    0x33b15a3b587d15c9,
];

/// The multiply-and-mix primitive: high and low halves of `v * p`, summed.
#[inline(always)]
pub fn mum(v: u64, p: u64) -> u64 {
    let r = (v as u128) * (p as u128);
    ((r >> 64) as u64).wrapping_add(r as u64)
}

/// Hashes `bytes` with the given seed.
pub fn hash(seed: u64, bytes: &[u8]) -> u64 {
    let mut result = mum(seed.wrapping_add(bytes.len() as u64), BLOCK_START_PRIME);

    // Strictly more than one block: an input of exactly one block goes
    // through the word loop below instead, without the extra unroll round.
    let mut rest = bytes;
    while rest.len() > UNROLL_FACTOR * WORD_SIZE {
        let (block, next) = rest.split_at(UNROLL_FACTOR * WORD_SIZE);
        for (word, &prime) in block.chunks_exact(WORD_SIZE).zip(&PRIMES) {
            result ^= mum(read_le(word), prime);
        }
        // The same primes come round again on the next block.
        result = mum(result, UNROLL_PRIME);
        rest = next;
    }

    let mut words = rest.chunks_exact(WORD_SIZE);
    for (word, &prime) in (&mut words).zip(&PRIMES) {
        result ^= mum(read_le(word), prime);
    }

    let tail = words.remainder();
    if !tail.is_empty() {
        result ^= mum(read_le(tail), TAIL_PRIME);
    }

    finish(result)
}

#[inline(always)]
fn finish(mut h: u64) -> u64 {
    h ^= mum(h, FINISH_PRIME_1);
    h ^= mum(h, FINISH_PRIME_2);
    h
}
