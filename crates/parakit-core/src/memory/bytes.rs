//! Text decoding for strings stored in target memory.
//!
//! The supported titles keep file names and other text in Shift-JIS.

use std::borrow::Cow;

use encoding_rs::SHIFT_JIS;

/// Decode Shift-JIS bytes, replacing malformed sequences.
pub fn decode_shift_jis(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, had_errors) = SHIFT_JIS.decode(bytes);
    if had_errors {
        tracing::trace!("Shift-JIS decode replaced malformed bytes");
    }
    text
}

/// Decode a NUL-terminated Shift-JIS buffer into an owned string.
///
/// Everything after the first NUL byte is ignored; a buffer without a
/// terminator is decoded whole.
pub fn decode_shift_jis_to_string(bytes: &[u8]) -> String {
    let end = memchr::memchr(0, bytes).unwrap_or(bytes.len());
    decode_shift_jis(&bytes[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ascii_stops_at_nul() {
        let bytes = b"th14_ud0001.rpy\0garbage";
        assert_eq!(decode_shift_jis_to_string(bytes), "th14_ud0001.rpy");
    }

    #[test]
    fn test_decode_without_terminator() {
        assert_eq!(decode_shift_jis_to_string(b"replay"), "replay");
    }

    #[test]
    fn test_decode_japanese() {
        // "東方" in Shift-JIS
        let bytes = [0x93, 0x8C, 0x95, 0xFB, 0x00];
        assert_eq!(decode_shift_jis_to_string(&bytes), "東方");
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode_shift_jis_to_string(&[0, 0x41]), "");
    }
}
