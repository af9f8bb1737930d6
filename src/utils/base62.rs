//! Base-62 codec used by the sequence-encoded code strategy.
//!
//! Alphabet order is `0-9`, `a-z`, `A-Z`; the most significant digit comes
//! first and zero encodes to `"0"`.

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Longest possible encoding of a `u64` (62^11 > 2^64).
const MAX_LEN: usize = 11;

/// Encodes `n` as a base-62 string.
pub fn encode(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut buf = [0u8; MAX_LEN];
    let mut i = buf.len();
    while n > 0 {
        i -= 1;
        buf[i] = ALPHABET[(n % 62) as usize];
        n /= 62;
    }

    buf[i..].iter().map(|&b| b as char).collect()
}

fn digit_value(c: u8) -> Option<u64> {
    match c {
        b'0'..=b'9' => Some((c - b'0') as u64),
        b'a'..=b'z' => Some((c - b'a') as u64 + 10),
        b'A'..=b'Z' => Some((c - b'A') as u64 + 36),
        _ => None,
    }
}

/// Decodes a base-62 string back into its integer value.
///
/// Returns `None` for empty input, characters outside the alphabet, or
/// values that overflow `u64`.
pub fn decode(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }

    s.bytes().try_fold(0u64, |acc, c| {
        acc.checked_mul(62)?.checked_add(digit_value(c)?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_is_distinct() {
        let mut seen = std::collections::HashSet::new();
        assert!(ALPHABET.iter().all(|c| seen.insert(*c)));
    }

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(9), "9");
        assert_eq!(encode(10), "a");
        assert_eq!(encode(35), "z");
        assert_eq!(encode(36), "A");
        assert_eq!(encode(61), "Z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(3843), "ZZ");
    }

    #[test]
    fn test_encode_max_value() {
        let encoded = encode(u64::MAX);
        assert_eq!(encoded.len(), MAX_LEN);
        assert_eq!(decode(&encoded), Some(u64::MAX));
    }

    #[test]
    fn test_decode_inverts_encode() {
        for n in [1u64, 42, 61, 62, 1_000, 916_132_831, 56_800_235_583] {
            assert_eq!(decode(&encode(n)), Some(n), "round trip failed for {n}");
        }
    }

    #[test]
    fn test_decode_rejects_invalid_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("abc-def"), None);
        assert_eq!(decode("ZZZZZZZZZZZZ"), None);
    }
}
