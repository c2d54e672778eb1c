//! SHA-256 fingerprints via `ring::digest`.

use ring::digest::{digest, SHA256};

/// SHA-256 of raw bytes (certificate DER), lowercase hex.
#[must_use]
pub fn sha256_bytes(data: &[u8]) -> String {
    hex::encode(digest(&SHA256, data).as_ref())
}

/// Render a lowercase hex digest as uppercase colon-separated pairs, the
/// way certificate viewers display fingerprints.
#[must_use]
pub fn colon_hex(hex_digest: &str) -> String {
    hex_digest
        .as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_bytes() {
        let hash = sha256_bytes(b"hello world");
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            sha256_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_colon_hex() {
        assert_eq!(colon_hex("0a1b2c"), "0A:1B:2C");
        assert_eq!(colon_hex(""), "");
    }
}
