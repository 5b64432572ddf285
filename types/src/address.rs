//! Author / witness address type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// A ledger address: 32 characters of upper-case RFC 4648 base32.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub const LENGTH: usize = 32;

    /// Wrap a raw address without validating it.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse and validate an address received from an untrusted source.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let well_formed = raw.len() == Self::LENGTH
            && raw
                .bytes()
                .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b));
        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(TypesError::InvalidAddress(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
