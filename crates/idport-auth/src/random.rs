//! Cryptographically secure random string generation and comparison helpers.
//!
//! Authorization codes, refresh tokens, and password salts are all drawn
//! from the same 62-symbol alphanumeric alphabet using the operating system
//! CSPRNG. A pseudo-random generator is never acceptable here.

use rand::Rng;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

/// The 62-symbol alphabet used for generated credentials.
const ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a random alphanumeric string of the given length.
///
/// Uses `OsRng` (the operating system CSPRNG) with uniform sampling over
/// the alphabet.
#[must_use]
pub fn alphanumeric(length: usize) -> String {
    let mut rng = OsRng;
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

/// Compares two byte slices in constant time.
///
/// Unequal lengths return `false` immediately; length is not secret for
/// the digests and secrets compared here.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Constant-time comparison of two strings.
#[must_use]
pub fn constant_time_eq_str(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphanumeric_length_and_alphabet() {
        for length in [0, 1, 16, 32, 48] {
            let s = alphanumeric(length);
            assert_eq!(s.len(), length);
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_alphanumeric_uniqueness() {
        let values: Vec<String> = (0..100).map(|_| alphanumeric(32)).collect();
        let mut unique = values.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(values.len(), unique.len());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
    }

    #[test]
    fn test_constant_time_eq_str_is_case_sensitive() {
        assert!(constant_time_eq_str("secret", "secret"));
        assert!(!constant_time_eq_str("secret", "Secret"));
    }
}
