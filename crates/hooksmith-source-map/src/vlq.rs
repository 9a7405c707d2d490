//! Base64 VLQ encoding used by the `mappings` field of v3 source maps.

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_SHIFT: u32 = 5;
const VLQ_CONTINUATION: u32 = 1 << VLQ_SHIFT;
const VLQ_MASK: u32 = VLQ_CONTINUATION - 1;

/// Appends the VLQ encoding of `value` to `out`.
pub(crate) fn encode(value: i64, out: &mut String) {
    // Sign goes in the least significant bit.
    let mut rest = if value < 0 {
        ((value.unsigned_abs() as u32) << 1) | 1
    } else {
        (value as u32) << 1
    };

    loop {
        let mut digit = rest & VLQ_MASK;
        rest >>= VLQ_SHIFT;
        if rest > 0 {
            digit |= VLQ_CONTINUATION;
        }
        out.push(BASE64[digit as usize] as char);
        if rest == 0 {
            break;
        }
    }
}

/// Encodes one mapping segment.
pub(crate) fn encode_segment(fields: &[i64], out: &mut String) {
    for &field in fields {
        encode(field, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: i64) -> String {
        let mut out = String::new();
        encode(value, &mut out);
        out
    }

    #[test]
    fn test_small_values() {
        assert_eq!(encoded(0), "A");
        assert_eq!(encoded(1), "C");
        assert_eq!(encoded(-1), "D");
        assert_eq!(encoded(2), "E");
        assert_eq!(encoded(15), "e");
    }

    #[test]
    fn test_continuation() {
        assert_eq!(encoded(16), "gB");
        assert_eq!(encoded(-16), "hB");
        assert_eq!(encoded(1000), "w+B");
    }

    #[test]
    fn test_segment() {
        let mut out = String::new();
        encode_segment(&[0, 0, 3, 0], &mut out);
        assert_eq!(out, "AAGA");
    }
}
