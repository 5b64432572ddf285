//! Unit storage trait.

use crate::StoreError;
use dagview_types::{Joint, UnitHash, UnitProps};

/// Point and range lookups over stored units.
pub trait UnitStore {
    /// Properties of a unit, `None` if the unit is unknown.
    fn get_props(&self, unit: &UnitHash) -> Result<Option<UnitProps>, StoreError>;

    /// Signed content of a unit, `None` if the unit is unknown.
    fn read_joint(&self, unit: &UnitHash) -> Result<Option<Joint>, StoreError>;

    /// The main-chain unit at the given main-chain index.
    fn main_chain_unit_at(&self, mci: u64) -> Result<Option<UnitProps>, StoreError>;

    /// The main-chain unit whose best parent is `best_parent`.
    ///
    /// At most one exists; `None` means `best_parent` is the current tip of
    /// the main chain (or is not on it).
    fn main_chain_child(&self, best_parent: &UnitHash) -> Result<Option<UnitProps>, StoreError>;

    /// Among main-chain units whose last ball is `last_ball_unit`, the one
    /// with the greatest main-chain index (ties: greatest unit id).
    fn latest_stabilizer(
        &self,
        last_ball_unit: &UnitHash,
    ) -> Result<Option<UnitProps>, StoreError>;

    /// Up to `limit` units with `rowid < before`, newest first.
    fn units_before_rowid(&self, before: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError>;

    /// Up to `limit` units with `rowid > after`, oldest first.
    fn units_after_rowid(&self, after: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError>;

    /// The `limit` most recently stored units, newest first.
    fn last_units(&self, limit: usize) -> Result<Vec<UnitProps>, StoreError> {
        self.units_before_rowid(u64::MAX, limit)
    }

    /// Total number of stored units.
    fn unit_count(&self) -> Result<u64, StoreError>;
}
