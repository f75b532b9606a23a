//! Optional zstd compression around the encoded envelope.
//!
//! Compression is strictly an outer stage: the bytes inside a zstd frame are
//! a complete envelope on their own. Decoding recognizes a compressed buffer
//! by the zstd frame magic, so the envelope itself carries no flag.

use zstd::stream::{decode_all, encode_all};

use crate::error::{Error, Result};

/// First four bytes of every zstd frame.
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// True if the buffer starts with a zstd frame.
pub fn is_compressed(buf: &[u8]) -> bool {
    buf.len() >= ZSTD_MAGIC.len() && buf[..ZSTD_MAGIC.len()] == ZSTD_MAGIC
}

/// Compress a buffer at the given zstd level. Any level at or below zero
/// returns the input unchanged. zstd reserves level 0 for its own default,
/// so the passthrough check has to come before handing the level over.
pub fn compress(buf: &[u8], level: i32) -> Result<Vec<u8>> {
    if level <= 0 {
        return Ok(buf.to_vec());
    }
    encode_all(buf, level).map_err(|e| Error::FailCompress(format!("{}", e)))
}

/// Undo [`compress`]. A buffer without the zstd frame magic is returned
/// unchanged, matching the passthrough levels on the compression side.
pub fn decompress(buf: &[u8]) -> Result<Vec<u8>> {
    if !is_compressed(buf) {
        return Ok(buf.to_vec());
    }
    decode_all(buf).map_err(|e| Error::FailDecompress(format!("{}", e)))
}
