//! Ledger snapshot: a JSON interchange document holding everything the
//! read stores serve.
//!
//! The explorer never writes to the ledger. Snapshots exist so a store can be
//! populated from a dump produced by the ledger engine, and so tests can
//! describe a DAG declaratively and load it into any backend.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use dagview_types::{
    AaResponse, Address, AssetRecord, CommissionOutput, Input, Output, UnitContent, UnitHash,
    UnitProps,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::author::UnitAuthor;
use crate::StoreError;

/// One unit with everything stored alongside it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredUnit {
    pub props: UnitProps,
    pub content: UnitContent,
    #[serde(default)]
    pub parents: Vec<UnitHash>,
    #[serde(default)]
    pub authors: Vec<UnitAuthor>,
    /// Witness list rows recorded for this unit.
    #[serde(default)]
    pub witnesses: Vec<Address>,
    #[serde(default)]
    pub outputs: Vec<Output>,
    #[serde(default)]
    pub inputs: Vec<Input>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub units: Vec<StoredUnit>,
    #[serde(default)]
    pub commission_outputs: Vec<CommissionOutput>,
    #[serde(default)]
    pub aa_responses: Vec<AaResponse>,
    #[serde(default)]
    pub assets: Vec<AssetRecord>,
    /// Address definitions keyed by definition chash.
    #[serde(default)]
    pub definitions: BTreeMap<String, Value>,
}

impl LedgerSnapshot {
    pub fn from_json_str(s: &str) -> Result<Self, StoreError> {
        let snapshot: Self = serde_json::from_str(s)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Backend(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the structural constraints every backend relies on for its
    /// indices: unique unit ids and rowids, content matching props, and at
    /// most one main-chain unit per index.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut units = HashSet::new();
        let mut rowids = HashSet::new();
        let mut mc_indexes = HashSet::new();
        for stored in &self.units {
            let props = &stored.props;
            if !units.insert(&props.unit) {
                return Err(StoreError::Duplicate(format!("unit {}", props.unit)));
            }
            if !rowids.insert(props.rowid) {
                return Err(StoreError::Duplicate(format!("rowid {}", props.rowid)));
            }
            if stored.content.unit != props.unit {
                return Err(StoreError::Corruption(format!(
                    "content of {} is stored under {}",
                    stored.content.unit, props.unit
                )));
            }
            if props.is_on_main_chain {
                let mci = props.main_chain_index.ok_or_else(|| {
                    StoreError::Corruption(format!(
                        "main-chain unit {} has no main-chain index",
                        props.unit
                    ))
                })?;
                if !mc_indexes.insert(mci) {
                    return Err(StoreError::Duplicate(format!("main-chain index {mci}")));
                }
            }
        }
        Ok(())
    }
}
