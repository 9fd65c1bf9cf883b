// Hex digest decoding for EDID tables
//
// Austin Shafer - 2025
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HexError {
    #[error("Hex digest has odd length {0}, trailing nibble would be dropped")]
    OddLength(usize),
    #[error("Invalid hex character {ch:?} at offset {offset}")]
    InvalidChar { ch: char, offset: usize },
}

/// Value of one hex nibble
///
/// Anything outside [0-9a-fA-F] counts as zero.
fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Convert a hex digest to raw bytes, pairwise
///
/// This is permissive: characters that are not hex digits decode as
/// a zero nibble, and a trailing odd nibble is dropped. The result
/// always holds `hex.len() / 2` bytes. Use `decode_hex_strict` to get
/// an error for either case instead.
pub fn decode_hex(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect()
}

/// Check that a hex digest would decode without any permissive fixups
pub fn validate_hex(hex: &str) -> Result<(), HexError> {
    if let Some((offset, ch)) = hex.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidChar { ch, offset });
    }

    if hex.len() % 2 != 0 {
        return Err(HexError::OddLength(hex.len()));
    }

    Ok(())
}

/// Decode a hex digest, rejecting anything `decode_hex` would paper over
pub fn decode_hex_strict(hex: &str) -> Result<Vec<u8>, HexError> {
    validate_hex(hex)?;
    Ok(decode_hex(hex))
}
