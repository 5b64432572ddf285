//! Unit hash type for the DAG.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// A content-addressed unit identifier (base64-encoded SHA-256, 44 chars).
///
/// Internally the hash is kept as the string the ledger engine produced, so
/// lookups never re-encode it.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitHash(String);

impl UnitHash {
    /// Length of a well-formed unit hash.
    pub const LENGTH: usize = 44;

    /// Wrap a raw identifier without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse an identifier received from an untrusted source.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        if raw.len() != Self::LENGTH {
            return Err(TypesError::InvalidUnitHash(format!(
                "expected {} characters, got {}",
                Self::LENGTH,
                raw.len()
            )));
        }
        let (body, pad) = raw.as_bytes().split_at(Self::LENGTH - 1);
        if pad != b"=" || !body.iter().copied().all(is_base64_char) {
            return Err(TypesError::InvalidUnitHash(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Abbreviated form used as a graph label: first 7 characters and `...`.
    pub fn short(&self) -> String {
        let head: String = self.0.chars().take(7).collect();
        format!("{head}...")
    }
}

fn is_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'+' || b == b'/'
}

impl fmt::Debug for UnitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitHash({})", self.short())
    }
}

impl fmt::Display for UnitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitHash {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
