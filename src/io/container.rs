//! Zlib compression and base64 text for saved and copied boards.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::error::DecodeError;

pub fn compress(bytes: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(level.min(9)));
    encoder.write_all(bytes)?;
    encoder.finish()
}

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut decoded = vec![];
    ZlibDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(decoded)
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Surrounding whitespace is ignored.
pub fn from_base64(text: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(STANDARD.decode(text.trim())?)
}
