use std::fmt;

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::DocumentReference;

/// SHA-256 of a [`DocumentReference`]; the dedup tracker's key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey([u8; 32]);

impl DocumentKey {
    pub fn from_reference(reference: &DocumentReference) -> Self {
        let digest = Sha256::digest(reference.as_str().as_bytes());
        Self(digest.into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DocumentKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
