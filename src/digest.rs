//! Content digests used to detect corruption on extraction.
//!
//! This is SHA-256 over the uncompressed bytes of a file. It is not keyed and
//! does not authenticate the archive.

use sha2::{Digest, Sha256};

/// Size of a stored content digest in bytes
pub const DIGEST_SIZE: usize = 32;

/// Fixed-size content digest
pub type ContentDigest = [u8; DIGEST_SIZE];

/// Compute the digest of `data`
pub fn content_digest(data: &[u8]) -> ContentDigest {
    Sha256::digest(data).into()
}

/// Lowercase hex rendering for error messages and listings
pub fn to_hex(digest: &ContentDigest) -> String {
    hex::encode(digest)
}
