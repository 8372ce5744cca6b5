//! Hex digit strings to and from bytes.
//!
//! Decoding does no validation of its own: callers check [`is_hex`] and pad
//! to the exact digit count with [`pad_left`] before calling
//! [`decode_hex_to_bytes`].

use std::fmt::Write;

/// Encode bytes as upper-case hex digits.
pub fn encode_bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// True if every character is an ASCII hex digit.
pub fn is_hex(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Left-pad `hex` with `'0'` up to `width` characters.
///
/// Input already `width` characters or longer is returned unchanged.
pub fn pad_left(hex: &str, width: usize) -> String {
    let fill = width.saturating_sub(hex.len());
    let mut padded = String::with_capacity(fill + hex.len());

    for _ in 0..fill {
        padded.push('0');
    }
    padded.push_str(hex);

    padded
}

/// Value of one ASCII hex digit; letters of either case map to 10..=15.
///
/// Non-hex input produces an unspecified value rather than an error.
fn nibble(c: u8) -> u8 {
    let letter = (c & 0x40) >> 6;
    ((c & 0x0f) + letter * 9) & 0x0f
}

/// Decode `len / 2` bytes from pairs of hex digits.
///
/// A trailing unpaired digit is ignored.
pub fn decode_hex_to_bytes(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect()
}

/// Pad `hex` to exactly `N` bytes worth of digits and decode it.
///
/// Returns `None` unless the input is all hex digits and no longer than `2 * N`.
pub fn decode_fixed<const N: usize>(hex: &str) -> Option<[u8; N]> {
    if hex.len() > N * 2 || !is_hex(hex) {
        return None;
    }

    let padded = pad_left(hex, N * 2);
    decode_hex_to_bytes(&padded).try_into().ok()
}

/// Indexed dump of bytes for trace logging, eight per line.
pub fn byte_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 8);
    for (i, byte) in bytes.iter().enumerate() {
        let sep = if i % 8 == 7 { '\n' } else { '\t' };
        let _ = write!(out, "[{}]={:02x}{}", i, byte, sep);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_case() {
        assert_eq!(decode_hex_to_bytes("0aFf10"), vec![0x0a, 0xff, 0x10]);
        assert_eq!(decode_hex_to_bytes("DEADbeef"), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_decode_ignores_trailing_digit() {
        assert_eq!(decode_hex_to_bytes("123"), vec![0x12]);
        assert!(decode_hex_to_bytes("").is_empty());
    }

    #[test]
    fn test_pad_left_short_input() {
        assert_eq!(pad_left("01A", 8), "0000001A");
        assert_eq!(pad_left("", 4), "0000");
    }

    #[test]
    fn test_pad_left_keeps_every_input_digit() {
        // Each input digit must land after the fill, in order.
        let padded = pad_left("ABC", 6);
        assert_eq!(&padded[..3], "000");
        assert_eq!(&padded[3..], "ABC");
    }

    #[test]
    fn test_pad_left_full_width_unchanged() {
        assert_eq!(pad_left("1234", 4), "1234");
        assert_eq!(pad_left("123456", 4), "123456");
    }

    #[test]
    fn test_is_hex() {
        assert!(is_hex("0123456789abcdefABCDEF"));
        assert!(is_hex(""));
        assert!(!is_hex("01G"));
        assert!(!is_hex("0x1A"));
    }

    #[test]
    fn test_decode_fixed() {
        assert_eq!(decode_fixed::<3>("01A"), Some([0x00, 0x00, 0x1a]));
        assert_eq!(decode_fixed::<2>("beef"), Some([0xbe, 0xef]));
        assert_eq!(decode_fixed::<2>("12345"), None);
        assert_eq!(decode_fixed::<2>("zz"), None);
    }

    #[test]
    fn test_encode_then_pad_zero_extends() {
        for bytes in [vec![0x1a], vec![0xff, 0x00, 0x7f], vec![0x01, 0x02, 0x03, 0x04]] {
            let hex = encode_bytes_to_hex(&bytes);
            let decoded = decode_hex_to_bytes(&pad_left(&hex, 10));

            assert_eq!(decoded.len(), 5);
            let (zeros, tail) = decoded.split_at(5 - bytes.len());
            assert!(zeros.iter().all(|&b| b == 0));
            assert_eq!(tail, bytes.as_slice());
        }
    }

    #[test]
    fn test_byte_dump() {
        assert_eq!(byte_dump(&[0x00, 0x1a]), "[0]=00\t[1]=1a\t");
        let dump = byte_dump(&[0u8; 9]);
        assert!(dump.contains("[7]=00\n[8]=00\t"));
    }
}
