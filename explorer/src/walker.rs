//! Main-chain walker: one step down the main chain at a time.

use dagview_store::{StoreError, UnitStore};
use dagview_types::{Timestamp, UnitHash, UnitProps};
use tracing::trace;

/// A main-chain unit reached by the walker, with its resolved timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MainChainStep {
    pub unit: UnitHash,
    pub main_chain_index: Option<u64>,
    pub timestamp: Timestamp,
}

impl MainChainStep {
    pub fn from_props(props: &UnitProps) -> Self {
        Self {
            unit: props.unit.clone(),
            main_chain_index: props.main_chain_index,
            timestamp: props.resolved_timestamp(),
        }
    }
}

/// Descends the main chain via the best-parent relation.
pub struct MainChainWalker<'a, U> {
    units: &'a U,
}

impl<'a, U: UnitStore> MainChainWalker<'a, U> {
    pub fn new(units: &'a U) -> Self {
        Self { units }
    }

    /// The main-chain unit whose best parent is `unit`.
    ///
    /// `Ok(None)` means the walk reached the current tip: nothing has been
    /// placed on the main chain below `unit` yet.
    pub fn step(&self, unit: &UnitHash) -> Result<Option<MainChainStep>, StoreError> {
        let next = self.units.main_chain_child(unit)?;
        trace!(from = %unit, to = ?next.as_ref().map(|p| &p.unit), "main-chain step");
        Ok(next.as_ref().map(MainChainStep::from_props))
    }
}
