use std::fmt;

/// The fixed-width output of one hash computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digest {
    U64(u64),
    U128(u128),
}

impl Digest {
    /// Width of the digest in bits.
    pub const fn bits(self) -> u32 {
        match self {
            Digest::U64(_) => 64,
            Digest::U128(_) => 128,
        }
    }

    /// The digest widened to 128 bits.
    pub const fn as_u128(self) -> u128 {
        match self {
            Digest::U64(v) => v as u128,
            Digest::U128(v) => v,
        }
    }

    /// The low 64 bits, which is what gets used when a digest seeds another
    /// computation.
    pub const fn low_u64(self) -> u64 {
        self.as_u128() as u64
    }

    /// Little-endian serialization: 8 or 16 bytes.
    pub fn to_le_bytes(self) -> Vec<u8> {
        match self {
            Digest::U64(v) => v.to_le_bytes().to_vec(),
            Digest::U128(v) => v.to_le_bytes().to_vec(),
        }
    }
}

impl From<u64> for Digest {
    fn from(v: u64) -> Self {
        Digest::U64(v)
    }
}

impl From<u128> for Digest {
    fn from(v: u128) -> Self {
        Digest::U128(v)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digest::U64(v) => fmt::Display::fmt(v, f),
            Digest::U128(v) => fmt::Display::fmt(v, f),
        }
    }
}

/// Zero-padded to the full digest width.
impl fmt::LowerHex for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        match self {
            Digest::U64(v) => write!(f, "{v:016x}"),
            Digest::U128(v) => write!(f, "{v:032x}"),
        }
    }
}
