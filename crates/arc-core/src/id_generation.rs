//! Issue id generation.
//!
//! Ids have the shape `<prefix>.<6-char base-36 hash>`, where the hash is
//! derived from the issue title and the current time. This crate always
//! produces 6 characters and leaves collision handling (detect on insert,
//! retry with a fresh timestamp) to the caller.

use sha2::{Digest, Sha256};

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const HASH_LENGTH: usize = 6;

/// Derive the `<prefix>.<hash>` id for a new issue.
///
/// `nonce` lets a caller retry with a different seed on a primary-key
/// collision without having to change the title or wait for the clock to
/// advance.
pub fn generate_issue_id(prefix: &str, title: &str, timestamp_nanos: i128, nonce: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(timestamp_nanos.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    let digest = hasher.finalize();

    // Fold the 32-byte digest into a single big-endian integer and render it
    // in base36, taking the low HASH_LENGTH digits. Folding (rather than
    // just reading the first bytes) spreads entropy from the whole digest
    // into the short suffix we keep.
    let mut acc: u128 = 0;
    for byte in digest.iter() {
        acc = acc.wrapping_mul(257).wrapping_add(u128::from(*byte));
    }

    let mut digits = [0u8; HASH_LENGTH];
    let mut value = acc;
    for slot in digits.iter_mut().rev() {
        let rem = (value % 36) as usize;
        *slot = BASE36_CHARS[rem];
        value /= 36;
    }

    let hash = String::from_utf8(digits.to_vec()).expect("base36 alphabet is valid UTF-8");
    format!("{prefix}.{hash}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_has_expected_shape() {
        let id = generate_issue_id("arc", "Fix the thing", 1_700_000_000_000_000_000, 0);
        let (prefix, hash) = id.split_once('.').expect("id must contain a separator");
        assert_eq!(prefix, "arc");
        assert_eq!(hash.len(), HASH_LENGTH);
        assert!(hash.chars().all(|c| c.is_ascii_alphanumeric() && c.is_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn different_nonces_change_the_hash() {
        let a = generate_issue_id("arc", "Same title", 1_700_000_000_000_000_000, 0);
        let b = generate_issue_id("arc", "Same title", 1_700_000_000_000_000_000, 1);
        assert_ne!(a, b);
    }

    #[test]
    fn different_titles_change_the_hash() {
        let a = generate_issue_id("arc", "Title A", 1_700_000_000_000_000_000, 0);
        let b = generate_issue_id("arc", "Title B", 1_700_000_000_000_000_000, 0);
        assert_ne!(a, b);
    }
}
