use std::hash::{BuildHasher, Hasher};

use metromum::{
    hasher::{BuildSeededHasher, FastHash, Metro128V1, Metro64V2, MetroCrc64V1, Mum64},
    metro64_v1, metro_crc64_v1, Algorithm, Family,
};
use proptest::prelude::*;

fn algorithm() -> impl Strategy<Value = Algorithm> {
    proptest::sample::select(Algorithm::ALL.to_vec())
}

fn bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..=300)
}

/// The seed bits an algorithm actually reads.
fn effective_seed(algorithm: Algorithm, seed: u64) -> u64 {
    match algorithm.configuration().family {
        Family::MetroHash => seed & 0xffff_ffff,
        Family::Mum => seed,
    }
}

proptest! {
    #[test]
    fn deterministic(algorithm in algorithm(), seed in any::<u64>(), data in bytes()) {
        let copy = data.clone();
        prop_assert_eq!(algorithm.hash(seed, &data), algorithm.hash(seed, &copy));
    }

    #[test]
    fn seed_sensitive(
        algorithm in algorithm(),
        a in any::<u64>(),
        b in any::<u64>(),
        data in bytes(),
    ) {
        prop_assume!(effective_seed(algorithm, a) != effective_seed(algorithm, b));
        prop_assert_ne!(algorithm.hash(a, &data), algorithm.hash(b, &data));
    }

    #[test]
    fn metrohash_ignores_high_seed_bits(
        algorithm in algorithm(),
        seed in any::<u64>(),
        high in any::<u32>(),
        data in bytes(),
    ) {
        prop_assume!(algorithm.configuration().family == Family::MetroHash);
        let other = seed ^ ((high as u64) << 32);
        prop_assert_eq!(algorithm.hash(seed, &data), algorithm.hash(other, &data));
    }

    #[test]
    fn variants_are_independent(seed in any::<u64>(), data in bytes()) {
        let pairs = [
            (Algorithm::Metro64V1, Algorithm::Metro64V2),
            (Algorithm::Metro128V1, Algorithm::Metro128V2),
            (Algorithm::MetroCrc64V1, Algorithm::MetroCrc64V2),
            (Algorithm::MetroCrc128V1, Algorithm::MetroCrc128V2),
        ];
        for (v1, v2) in pairs {
            prop_assert_ne!(v1.hash(seed, &data), v2.hash(seed, &data));
        }
    }

    #[test]
    fn input_sensitive(algorithm in algorithm(), seed in any::<u64>(), data in bytes(), bit in any::<usize>()) {
        prop_assume!(!data.is_empty());
        let mut flipped = data.clone();
        let bit = bit % (data.len() * 8);
        flipped[bit / 8] ^= 1 << (bit % 8);
        prop_assert_ne!(algorithm.hash(seed, &data), algorithm.hash(seed, &flipped));
    }

    /// Inputs made only of 8 and 16-byte tail steps never touch the CRC.
    #[test]
    fn crc_agrees_without_crc_steps(seed in any::<u64>(), data in proptest::collection::vec(any::<u8>(), 0..=24)) {
        let data = &data[..data.len() / 8 * 8];
        prop_assert_eq!(metro_crc64_v1(seed, data), metro64_v1(seed, data));
    }

    #[test]
    fn crc_changes_block_digests(seed in any::<u64>(), data in proptest::collection::vec(any::<u8>(), 32..=300)) {
        prop_assert_ne!(metro_crc64_v1(seed, &data), metro64_v1(seed, &data));
    }

    #[test]
    fn parts_chain(algorithm in algorithm(), seed in any::<u64>(), a in bytes(), b in bytes()) {
        let first = algorithm.hash(seed, &a);
        let expected = algorithm.hash(first.low_u64(), &b);
        prop_assert_eq!(algorithm.hash_parts(seed, [&a[..], &b[..]]), expected);
        prop_assert_eq!(algorithm.hash_parts(seed, [&a[..]]), first);
    }

    #[test]
    fn hasher_buffers_writes(seed in any::<u64>(), data in bytes(), split in any::<usize>()) {
        let split = split % (data.len() + 1);
        let (a, b) = data.split_at(split);

        let build = BuildSeededHasher::<Mum64>::new(seed);
        let mut hasher = build.build_hasher();
        hasher.write(a);
        hasher.write(b);
        prop_assert_eq!(hasher.finish(), Mum64::hash_with_seed(seed, &data));

        let build = BuildSeededHasher::<Metro128V1>::new(seed);
        let mut hasher = build.build_hasher();
        hasher.write(a);
        hasher.write(b);
        prop_assert_eq!(hasher.finish(), Metro128V1::hash_with_seed(seed, &data) as u64);
    }

    #[test]
    fn typed_handles_match_dispatch(seed in any::<u64>(), data in bytes()) {
        prop_assert_eq!(
            Metro64V2::hash_with_seed(seed, &data) as u128,
            Metro64V2::ALGORITHM.hash(seed, &data).as_u128()
        );
        prop_assert_eq!(
            MetroCrc64V1::hash_with_seed(seed, &data) as u128,
            Algorithm::MetroCrc64V1.hash(seed, &data).as_u128()
        );
    }
}
