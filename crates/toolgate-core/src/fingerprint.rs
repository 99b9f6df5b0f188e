//! Stable hashing used to build coalescing keys, permission cache keys, and
//! token fingerprints without ever storing or logging the raw secret.
//!
//! A fingerprint is a hex-encoded SHA-256 digest. It is deliberately one-way:
//! nothing in this workspace needs to recover the original string from its
//! fingerprint, only to compare two fingerprints for equality.

use sha2::{Digest, Sha256};

/// Hashes `input` and returns its hex-encoded SHA-256 digest.
pub fn fingerprint(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Builds a coalescing/cache key from an ordered list of parts, joining them
/// with a separator byte that cannot appear in any part's own fingerprint
/// before hashing, so `("ab", "c")` and `("a", "bc")` never collide.
pub fn composite_fingerprint<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = parts
        .into_iter()
        .map(|part| fingerprint(part.as_ref()))
        .collect::<Vec<_>>()
        .join("\u{1f}");
    fingerprint(&joined)
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
