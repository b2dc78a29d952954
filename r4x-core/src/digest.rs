//! Content-addressed names for script bodies.

use std::fmt;

use sha1::{Digest as _, Sha1};

/// Length of a digest in hexadecimal characters.
pub const DIGEST_LEN: usize = 40;

/// Lowercase hexadecimal SHA1 of a byte buffer.
///
/// This is the name Redis gives a script body (`SCRIPT LOAD` returns it and
/// `EVALSHA` accepts it), so identical scripts always map to the same name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Computes the digest of `data` in one shot.
    pub fn of(data: &[u8]) -> Self {
        let hash = Sha1::digest(data);
        let mut hex_digest = [0u8; DIGEST_LEN];
        // 20 bytes of hash always encode into exactly 40 hex characters.
        hex_digest.copy_from_slice(hex::encode(hash).as_bytes());
        Self(hex_digest)
    }

    /// The digest as a string slice.
    pub fn as_str(&self) -> &str {
        // Only ASCII hex digits are ever written into the buffer.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    /// The digest as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of characters, always [`DIGEST_LEN`].
    pub fn len(&self) -> usize {
        DIGEST_LEN
    }

    /// Always `false`; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Digest").field(&self.as_str()).finish()
    }
}
