use std::fmt::Display;
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::{Error, Result};

pub const HASH_BYTE_LEN: usize = 20;
pub const HASH_HEX_LEN: usize = 40;

/// A SHA1 digest, the identity of every object in the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash([u8; HASH_BYTE_LEN]);

impl Hash {
    /// Returns the SHA1 hash for the data passed.
    pub fn new(value: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(value);
        Hash(hasher.finalize().into())
    }
}

impl From<[u8; HASH_BYTE_LEN]> for Hash {
    fn from(raw: [u8; HASH_BYTE_LEN]) -> Self {
        Hash(raw)
    }
}

impl FromStr for Hash {
    type Err = Error;

    /// Parses a 40 character hexadecimal string into a hash.
    fn from_str(s: &str) -> Result<Self> {
        if s.len() != HASH_HEX_LEN {
            return Err(Error::corrupted(format!(
                "expected a {} character hash, got {:?}",
                HASH_HEX_LEN, s
            )));
        }
        let mut raw = [0u8; HASH_BYTE_LEN];
        hex::decode_to_slice(s, &mut raw)
            .map_err(|e| Error::corrupted(format!("hash {:?} is not valid hex: {}", s, e)))?;
        Ok(Hash(raw))
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(hex::encode(self.0).as_str())
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Tests
