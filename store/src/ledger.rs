//! Unified Ledger trait: one handle to every read store.
//!
//! The explorer is generic over this trait so the same traversal code runs
//! against LMDB in production and the in-memory nullable store in tests.

use crate::aa::AaResponseStore;
use crate::asset::AssetStore;
use crate::author::AuthorStore;
use crate::output::{CommissionStore, OutputStore};
use crate::parenthood::ParenthoodStore;
use crate::unit::UnitStore;
use crate::StoreError;

pub trait Ledger {
    type Units: UnitStore;
    type Parenthoods: ParenthoodStore;
    type Authors: AuthorStore;
    type Outputs: OutputStore;
    type Commissions: CommissionStore;
    type AaResponses: AaResponseStore;
    type Assets: AssetStore;

    fn unit_store(&self) -> &Self::Units;
    fn parenthood_store(&self) -> &Self::Parenthoods;
    fn author_store(&self) -> &Self::Authors;
    fn output_store(&self) -> &Self::Outputs;
    fn commission_store(&self) -> &Self::Commissions;
    fn aa_response_store(&self) -> &Self::AaResponses;
    fn asset_store(&self) -> &Self::Assets;

    /// Ledger summary statistics.
    fn summary(&self) -> Result<LedgerSummary, StoreError> {
        let units = self.unit_store().unit_count()?;
        let newest = self.unit_store().last_units(1)?.into_iter().next();
        Ok(LedgerSummary {
            units,
            last_rowid: newest.as_ref().map(|p| p.rowid),
            last_main_chain_index: newest.and_then(|p| p.main_chain_index),
        })
    }
}

/// Summary statistics for the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSummary {
    pub units: u64,
    pub last_rowid: Option<u64>,
    /// Main-chain index of the newest stored unit, if it has one yet.
    pub last_main_chain_index: Option<u64>,
}
