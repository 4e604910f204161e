use thiserror::Error;

use crate::config::Family;

/// Raised when a requested hash configuration does not exist.
///
/// Always detected before any mixing state is set up; there is no fallback
/// to a neighbouring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("{family} has no {width}-bit form")]
    UnsupportedWidth { family: Family, width: u16 },

    #[error("{family} has no variant {variant}")]
    UnsupportedVariant { family: Family, variant: u8 },

    #[error("{family} has no CRC-accelerated form")]
    CrcUnavailable { family: Family },

    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),
}
