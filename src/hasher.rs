//! Typed handles over the nine configurations.
//!
//! Each configuration gets a zero-sized type implementing [`FastHash`], so
//! generic code can be monomorphized over an algorithm.  [`BuildSeededHasher`]
//! plugs any of them into `std::collections::HashMap` and friends.

use std::{fmt::Debug, hash::BuildHasher, marker::PhantomData};

use crate::config::Algorithm;

/// A fast non-cryptographic hash with a fixed configuration.
///
/// Fine for hash tables, sharding and fingerprints.  Not for anything where
/// an adversary picks the input.
pub trait FastHash {
    const ALGORITHM: Algorithm;

    /// `u64` or `u128`.
    type Output: Copy + Eq + Debug + Default + Into<u128>;

    /// Hashes `data` with seed 0.
    #[inline]
    fn hash(data: &[u8]) -> Self::Output {
        Self::hash_with_seed(0, data)
    }

    fn hash_with_seed(seed: u64, data: &[u8]) -> Self::Output;
}

macro_rules! fast_hash {
    ($(#[$doc:meta])* $name:ident, $algorithm:ident, $output:ty, $func:path) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name;

        impl FastHash for $name {
            const ALGORITHM: Algorithm = Algorithm::$algorithm;
            type Output = $output;

            #[inline]
            fn hash_with_seed(seed: u64, data: &[u8]) -> $output {
                $func(seed, data)
            }
        }
    };
}

fast_hash!(Metro64V1, Metro64V1, u64, crate::metro64_v1);
fast_hash!(Metro64V2, Metro64V2, u64, crate::metro64_v2);
fast_hash!(Metro128V1, Metro128V1, u128, crate::metro128_v1);
fast_hash!(Metro128V2, Metro128V2, u128, crate::metro128_v2);
fast_hash!(MetroCrc64V1, MetroCrc64V1, u64, crate::metro_crc64_v1);
fast_hash!(MetroCrc64V2, MetroCrc64V2, u64, crate::metro_crc64_v2);
fast_hash!(MetroCrc128V1, MetroCrc128V1, u128, crate::metro_crc128_v1);
fast_hash!(MetroCrc128V2, MetroCrc128V2, u128, crate::metro_crc128_v2);
fast_hash!(
    /// The only MUM configuration.
    Mum64,
    Mum64,
    u64,
    crate::mum64
);

/// `BuildHasher` for any [`FastHash`], carrying the seed.
pub struct BuildSeededHasher<H> {
    seed: u64,
    _algorithm: PhantomData<fn() -> H>,
}

impl<H> BuildSeededHasher<H> {
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
            _algorithm: PhantomData,
        }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

// Manual impls, so that `H` itself needn't implement anything.
impl<H> Clone for BuildSeededHasher<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for BuildSeededHasher<H> {}

impl<H> Default for BuildSeededHasher<H> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<H> Debug for BuildSeededHasher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildSeededHasher")
            .field("seed", &self.seed)
            .finish()
    }
}

impl<H: FastHash> BuildHasher for BuildSeededHasher<H> {
    type Hasher = SeededHasher<H>;

    fn build_hasher(&self) -> SeededHasher<H> {
        SeededHasher::new(self.seed)
    }
}

/// A `std::hash::Hasher` that collects everything written to it and hashes
/// it in one go when finished.
///
/// The one-shot algorithms can't be fed incrementally, so `finish` sees the
/// concatenation of all writes.  128-bit digests are cut to their low half.
pub struct SeededHasher<H> {
    seed: u64,
    buffer: Vec<u8>,
    _algorithm: PhantomData<fn() -> H>,
}

impl<H> SeededHasher<H> {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            buffer: Vec::new(),
            _algorithm: PhantomData,
        }
    }
}

impl<H> Debug for SeededHasher<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededHasher")
            .field("seed", &self.seed)
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl<H: FastHash> std::hash::Hasher for SeededHasher<H> {
    fn write(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        let digest: u128 = H::hash_with_seed(self.seed, &self.buffer).into();
        digest as u64
    }
}
