//! Author, definition and witness-list storage trait.

use crate::StoreError;
use dagview_types::{Address, UnitHash};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An address that signed a unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAuthor {
    pub address: Address,
    /// Set when the unit revealed (or changed) the author's definition.
    pub definition_chash: Option<String>,
}

pub trait AuthorStore {
    /// Authors of a unit, sorted by address.
    fn authors_of(&self, unit: &UnitHash) -> Result<Vec<UnitAuthor>, StoreError>;

    /// Address definition by its checksummed hash.
    fn definition(&self, definition_chash: &str) -> Result<Option<Value>, StoreError>;

    /// Witness list stored for `unit`; empty if the unit did not carry one.
    fn unit_witnesses(&self, unit: &UnitHash) -> Result<Vec<Address>, StoreError>;
}
