//! Decoding of NUL-terminated character data out of landing buffers.

use simdutf8::basic::from_utf8;

use crate::constant::{Len, NO_TOTAL};

/// Number of bytes of character data in a landing buffer of `buf_len` bytes.
///
/// The driver reports the full length of the value in `fetched`, which may exceed what
/// fit. At most `buf_len - unit` bytes hold data; the last unit is the terminator.
/// `NO_TOTAL` (or any other negative length) means the data fills the buffer.
pub(crate) fn data_len(fetched: Len, buf_len: usize, unit: usize) -> usize {
    let capacity = buf_len.saturating_sub(unit);
    let len = if fetched == NO_TOTAL || fetched < 0 {
        capacity
    } else {
        (fetched as usize).min(capacity)
    };
    len - len % unit
}

/// Decode narrow character data, stopping at the first NUL.
pub(crate) fn decode_narrow(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    let bytes = &bytes[..end];
    match from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode native-endian UTF-16 code units, stopping at the first NUL unit.
///
/// Surrogate pairs become one code point; unpaired surrogates become U+FFFD.
pub(crate) fn decode_wide(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .take_while(|u| *u != 0);
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Encode `s` as native-endian UTF-16 code units.
pub(crate) fn encode_wide(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_ne_bytes).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::NULL_DATA;

    #[test]
    fn data_len_clamps_to_buffer() {
        assert_eq!(data_len(5, 11, 1), 5);
        assert_eq!(data_len(20, 11, 1), 10);
        assert_eq!(data_len(NO_TOTAL, 11, 1), 10);
        assert_eq!(data_len(NULL_DATA, 11, 1), 10);
        assert_eq!(data_len(20, 8, 2), 6);
        assert_eq!(data_len(3, 8, 2), 2);
        assert_eq!(data_len(4, 0, 1), 0);
    }

    #[test]
    fn narrow_stops_at_nul() {
        assert_eq!(decode_narrow(b"hello\0junk"), "hello");
        assert_eq!(decode_narrow(b"plain"), "plain");
    }

    #[test]
    fn narrow_invalid_utf8_is_lossy() {
        assert_eq!(decode_narrow(b"a\xffb"), "a\u{fffd}b");
    }

    #[test]
    fn wide_decodes_surrogate_pairs() {
        let mut bytes = encode_wide("h\u{1F600}");
        bytes.extend_from_slice(&[0, 0, 0x41, 0]);
        assert_eq!(decode_wide(&bytes), "h\u{1F600}");
    }

    #[test]
    fn wide_unpaired_surrogate_is_replaced() {
        let bytes: Vec<u8> = [0x0041u16, 0xD800, 0x0042]
            .into_iter()
            .flat_map(u16::to_ne_bytes)
            .collect();
        assert_eq!(decode_wide(&bytes), "A\u{fffd}B");
    }
}
