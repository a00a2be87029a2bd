//! Content digests
//!
//! SHA-256 over the raw original bytes. Only ever compared for equality.

use std::fmt;

use sha2::{Digest, Sha256};

/// Digest length in bytes
pub const DIGEST_LEN: usize = 32;

/// Fixed-length fingerprint of an image's original bytes
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Hash `bytes`
    pub fn of(bytes: &[u8]) -> Self {
        let mut out = [0u8; DIGEST_LEN];
        out.copy_from_slice(&Sha256::digest(bytes));
        Self(out)
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
