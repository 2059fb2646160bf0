//! Content digests

use sha2::{Digest, Sha256};

/// Length of a hex-encoded digest
pub const DIGEST_LEN: usize = 64;

/// Compute the SHA-256 digest of a payload as lowercase hex.
///
/// The empty payload is valid input and yields the digest of the empty
/// sequence.
pub fn digest(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_known_vectors() {
        assert_eq!(
            digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_is_deterministic() {
        let payload = [0x00u8, 0x01];
        let first = digest(&payload);
        assert_eq!(first, digest(&payload));
        assert_eq!(first.len(), DIGEST_LEN);
        assert!(first
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}
