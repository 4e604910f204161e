/// Loads up to 8 bytes as a zero-extended little-endian word.
///
/// Never reads past `bytes`, so it serves full words as well as every
/// partial tail read.
#[inline(always)]
pub(crate) fn read_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
