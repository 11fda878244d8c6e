//! Deterministic hashing for persisted names

use std::fmt::Write;

/// Hex-encoded SHA-256 digest of `input`
///
/// Uses `aws_lc_rs` rather than `DefaultHasher`, whose output is not stable
/// across Rust releases; these digests end up in resource names.
pub fn sha256_hex(input: &[u8]) -> String {
    use aws_lc_rs::digest;
    let hash = digest::digest(&digest::SHA256, input);
    hash.as_ref()
        .iter()
        .fold(String::with_capacity(64), |mut s, b| {
            let _ = write!(s, "{:02x}", b);
            s
        })
}
