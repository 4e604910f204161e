//! Selecting a hash configuration.
//!
//! A [`HashConfiguration`] is what a caller asks for; an [`Algorithm`] is one
//! of the nine configurations that actually exist.  Resolution happens up
//! front, so no mixing state is ever created for a request that can't be
//! served.

use std::{fmt, str::FromStr};

use crate::{
    crc::Castagnoli,
    digest::Digest,
    error::ConfigurationError,
    metrohash::{metro128, metro64},
    mum,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    MetroHash,
    Mum,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Family::MetroHash => "MetroHash",
            Family::Mum => "MUM",
        })
    }
}

/// A requested (family, width, variant, crc) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfiguration {
    pub family: Family,
    pub width_bits: u16,
    pub variant: u8,
    pub crc: bool,
}

impl HashConfiguration {
    pub const fn metro(width_bits: u16, variant: u8, crc: bool) -> Self {
        Self {
            family: Family::MetroHash,
            width_bits,
            variant,
            crc,
        }
    }

    pub const fn mum() -> Self {
        Self {
            family: Family::Mum,
            width_bits: 64,
            variant: 1,
            crc: false,
        }
    }

    /// Maps the request onto the configuration that implements it.
    pub fn resolve(&self) -> Result<Algorithm, ConfigurationError> {
        use Algorithm::*;

        let family = self.family;
        match family {
            Family::MetroHash => {
                let wide = match self.width_bits {
                    64 => false,
                    128 => true,
                    width => return Err(ConfigurationError::UnsupportedWidth { family, width }),
                };
                Ok(match (wide, self.variant, self.crc) {
                    (false, 1, false) => Metro64V1,
                    (false, 2, false) => Metro64V2,
                    (true, 1, false) => Metro128V1,
                    (true, 2, false) => Metro128V2,
                    (false, 1, true) => MetroCrc64V1,
                    (false, 2, true) => MetroCrc64V2,
                    (true, 1, true) => MetroCrc128V1,
                    (true, 2, true) => MetroCrc128V2,
                    (_, variant, _) => {
                        return Err(ConfigurationError::UnsupportedVariant { family, variant })
                    }
                })
            }
            Family::Mum => {
                if self.width_bits != 64 {
                    return Err(ConfigurationError::UnsupportedWidth {
                        family,
                        width: self.width_bits,
                    });
                }
                if self.variant != 1 {
                    return Err(ConfigurationError::UnsupportedVariant {
                        family,
                        variant: self.variant,
                    });
                }
                if self.crc {
                    return Err(ConfigurationError::CrcUnavailable { family });
                }
                Ok(Mum64)
            }
        }
    }
}

/// One of the implemented configurations.  This is the flat dispatch key:
/// each variant carries its own immutable parameter table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Metro64V1,
    Metro64V2,
    Metro128V1,
    Metro128V2,
    MetroCrc64V1,
    MetroCrc64V2,
    MetroCrc128V1,
    MetroCrc128V2,
    Mum64,
}

impl Algorithm {
    pub const ALL: [Algorithm; 9] = [
        Algorithm::Metro64V1,
        Algorithm::Metro64V2,
        Algorithm::Metro128V1,
        Algorithm::Metro128V2,
        Algorithm::MetroCrc64V1,
        Algorithm::MetroCrc64V2,
        Algorithm::MetroCrc128V1,
        Algorithm::MetroCrc128V2,
        Algorithm::Mum64,
    ];

    /// The name of the matching free function in the crate root.
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Metro64V1 => "metro64_v1",
            Algorithm::Metro64V2 => "metro64_v2",
            Algorithm::Metro128V1 => "metro128_v1",
            Algorithm::Metro128V2 => "metro128_v2",
            Algorithm::MetroCrc64V1 => "metro_crc64_v1",
            Algorithm::MetroCrc64V2 => "metro_crc64_v2",
            Algorithm::MetroCrc128V1 => "metro_crc128_v1",
            Algorithm::MetroCrc128V2 => "metro_crc128_v2",
            Algorithm::Mum64 => "mum64",
        }
    }

    pub const fn configuration(self) -> HashConfiguration {
        match self {
            Algorithm::Metro64V1 => HashConfiguration::metro(64, 1, false),
            Algorithm::Metro64V2 => HashConfiguration::metro(64, 2, false),
            Algorithm::Metro128V1 => HashConfiguration::metro(128, 1, false),
            Algorithm::Metro128V2 => HashConfiguration::metro(128, 2, false),
            Algorithm::MetroCrc64V1 => HashConfiguration::metro(64, 1, true),
            Algorithm::MetroCrc64V2 => HashConfiguration::metro(64, 2, true),
            Algorithm::MetroCrc128V1 => HashConfiguration::metro(128, 1, true),
            Algorithm::MetroCrc128V2 => HashConfiguration::metro(128, 2, true),
            Algorithm::Mum64 => HashConfiguration::mum(),
        }
    }

    pub const fn digest_bits(self) -> u32 {
        self.configuration().width_bits as u32
    }

    pub const fn digest_size_bytes(self) -> usize {
        self.digest_bits() as usize / 8
    }

    /// Hashes `bytes`.
    pub fn hash(self, seed: u64, bytes: &[u8]) -> Digest {
        match self {
            Algorithm::Metro64V1 => metro64::hash(&metro64::V1, seed, bytes).into(),
            Algorithm::Metro64V2 => metro64::hash(&metro64::V2, seed, bytes).into(),
            Algorithm::Metro128V1 => metro128::hash(&metro128::V1, seed, bytes).into(),
            Algorithm::Metro128V2 => metro128::hash(&metro128::V2, seed, bytes).into(),
            Algorithm::MetroCrc64V1 => {
                metro64::hash_crc(&metro64::CRC_V1, &Castagnoli, seed, bytes).into()
            }
            Algorithm::MetroCrc64V2 => {
                metro64::hash_crc(&metro64::CRC_V2, &Castagnoli, seed, bytes).into()
            }
            Algorithm::MetroCrc128V1 => {
                metro128::hash_crc(&metro128::CRC_V1, &Castagnoli, seed, bytes).into()
            }
            Algorithm::MetroCrc128V2 => {
                metro128::hash_crc(&metro128::CRC_V2, &Castagnoli, seed, bytes).into()
            }
            Algorithm::Mum64 => mum::hash(seed, bytes).into(),
        }
    }

    /// Hashes several byte sequences in turn, each seeded with the low 64
    /// bits of the previous digest.
    ///
    /// With no parts nothing is hashed and the seed itself comes back,
    /// widened to the algorithm's digest width.  That keeps the chain
    /// composable (`hash_parts(hash_parts(s, a).low_u64(), b)` equals
    /// `hash_parts(s, a ++ b)` for any split, including empty ones), but the
    /// result is not a digest of anything: callers that need one must pass
    /// at least one part.
    pub fn hash_parts<'a, I>(self, seed: u64, parts: I) -> Digest
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let start = match self.digest_bits() {
            64 => Digest::U64(seed),
            _ => Digest::U128(seed as u128),
        };
        parts
            .into_iter()
            .fold(start, |digest, part| self.hash(digest.low_u64(), part))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigurationError;

    /// Accepts the function names, case-insensitively, with `-` and `_`
    /// interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == wanted)
            .ok_or_else(|| ConfigurationError::UnknownAlgorithm(s.to_string()))
    }
}

/// Hashes `bytes` under a requested configuration.
pub fn hash(
    configuration: &HashConfiguration,
    seed: u64,
    bytes: &[u8],
) -> Result<Digest, ConfigurationError> {
    Ok(configuration.resolve()?.hash(seed, bytes))
}
