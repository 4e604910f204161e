//! Fast non-cryptographic hashing: the MetroHash and MUM families.
//!
//! Every algorithm maps a byte slice and a 64-bit seed to a 64 or 128-bit
//! digest.  The nine configurations are reachable three ways:
//!
//! - the free functions below, one per configuration,
//! - [`config::Algorithm`] / [`config::HashConfiguration`] for runtime
//!   selection,
//! - the zero-sized types in [`hasher`] for generic code and `HashMap`s.
//!
//! None of these are suitable where an attacker controls the input.

pub mod config;
pub mod crc;
pub mod digest;
pub mod error;
pub mod hasher;
pub mod metrohash;
pub mod mum;
pub mod stats;

mod words;

pub use config::{Algorithm, Family, HashConfiguration};
pub use digest::Digest;
pub use error::ConfigurationError;

use crc::Castagnoli;
use metrohash::{metro128, metro64};

/// MetroHash64, variant 1.  Only the low 32 bits of `seed` are used.
pub fn metro64_v1(seed: u64, bytes: &[u8]) -> u64 {
    metro64::hash(&metro64::V1, seed, bytes)
}

/// MetroHash64, variant 2.  Only the low 32 bits of `seed` are used.
pub fn metro64_v2(seed: u64, bytes: &[u8]) -> u64 {
    metro64::hash(&metro64::V2, seed, bytes)
}

/// MetroHash128, variant 1.  Only the low 32 bits of `seed` are used.
pub fn metro128_v1(seed: u64, bytes: &[u8]) -> u128 {
    metro128::hash(&metro128::V1, seed, bytes)
}

/// MetroHash128, variant 2.  Only the low 32 bits of `seed` are used.
pub fn metro128_v2(seed: u64, bytes: &[u8]) -> u128 {
    metro128::hash(&metro128::V2, seed, bytes)
}

/// MetroHash64 with CRC-32C absorption, variant 1.
pub fn metro_crc64_v1(seed: u64, bytes: &[u8]) -> u64 {
    metro64::hash_crc(&metro64::CRC_V1, &Castagnoli, seed, bytes)
}

/// MetroHash64 with CRC-32C absorption, variant 2.
pub fn metro_crc64_v2(seed: u64, bytes: &[u8]) -> u64 {
    metro64::hash_crc(&metro64::CRC_V2, &Castagnoli, seed, bytes)
}

/// MetroHash128 with CRC-32C absorption, variant 1.
pub fn metro_crc128_v1(seed: u64, bytes: &[u8]) -> u128 {
    metro128::hash_crc(&metro128::CRC_V1, &Castagnoli, seed, bytes)
}

/// MetroHash128 with CRC-32C absorption, variant 2.
pub fn metro_crc128_v2(seed: u64, bytes: &[u8]) -> u128 {
    metro128::hash_crc(&metro128::CRC_V2, &Castagnoli, seed, bytes)
}

/// MUM hash, 64-bit.  Uses the whole seed.
pub fn mum64(seed: u64, bytes: &[u8]) -> u64 {
    mum::hash(seed, bytes)
}
