//! Asset registry records.

use serde::{Deserialize, Serialize};

use crate::unit::UnitHash;

/// An asset, identified by the unit that defined it.
///
/// `name` and `decimals` come from registry metadata and are absent for
/// unregistered assets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset: UnitHash,
    pub name: Option<String>,
    pub decimals: Option<u8>,
}
