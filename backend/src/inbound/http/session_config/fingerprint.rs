//! Session key fingerprint logged at startup.
//!
//! Operators compare fingerprints across replicas to confirm every instance
//! signs cookies with the same key; the key itself never reaches the logs.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Bytes of the SHA-256 digest kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 of the key's signing half, as lowercase hex.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use clinic_backend::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn same_material_gives_same_fingerprint() {
        let first = Key::derive_from(&[b'c'; 64]);
        let second = Key::derive_from(&[b'c'; 64]);

        assert_eq!(key_fingerprint(&first), key_fingerprint(&second));
    }

    #[rstest]
    fn fingerprint_is_short_lowercase_hex() {
        let fp = key_fingerprint(&Key::generate());

        assert_eq!(fp.len(), FINGERPRINT_BYTES * 2);
        assert!(fp.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[rstest]
    fn distinct_keys_are_distinguishable() {
        let clinic_a = Key::derive_from(&[b'a'; 64]);
        let clinic_b = Key::derive_from(&[b'b'; 64]);

        assert_ne!(key_fingerprint(&clinic_a), key_fingerprint(&clinic_b));
    }
}
