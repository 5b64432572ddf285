//! LMDB implementation of UnitStore.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, RoTxn};

use dagview_store::{StoreError, UnitStore};
use dagview_types::{Joint, UnitContent, UnitHash, UnitProps};

use crate::codec::{decode, decode_json};
use crate::keys::{
    increment_prefix, last_ball_stabilizer, prefix_bounds, unit_from_bytes, unit_prefix,
};
use crate::LmdbError;

pub struct LmdbUnitStore {
    pub(crate) env: Arc<Env>,
    pub(crate) props_db: Database<Bytes, Bytes>,
    pub(crate) joints_db: Database<Bytes, Bytes>,
    pub(crate) rowids_db: Database<Bytes, Bytes>,
    pub(crate) mc_index_db: Database<Bytes, Bytes>,
    pub(crate) mc_children_db: Database<Bytes, Bytes>,
    pub(crate) last_balls_db: Database<Bytes, Bytes>,
}

impl LmdbUnitStore {
    fn props_in(&self, rtxn: &RoTxn, unit: &UnitHash) -> Result<Option<UnitProps>, StoreError> {
        match self
            .props_db
            .get(rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// Props of a unit named by one of the secondary indices. The index and
    /// the props table are written in the same transaction, so a dangling
    /// entry means the database is damaged.
    fn indexed_props(
        &self,
        rtxn: &RoTxn,
        unit_bytes: &[u8],
        index: &str,
    ) -> Result<UnitProps, StoreError> {
        let unit = unit_from_bytes(unit_bytes)?;
        self.props_in(rtxn, &unit)?.ok_or_else(|| {
            StoreError::Corruption(format!("{index} names {unit} but its props are missing"))
        })
    }
}

impl UnitStore for LmdbUnitStore {
    fn get_props(&self, unit: &UnitHash) -> Result<Option<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.props_in(&rtxn, unit)
    }

    fn read_joint(&self, unit: &UnitHash) -> Result<Option<Joint>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let Some(bytes) = self
            .joints_db
            .get(&rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        else {
            return Ok(None);
        };
        let content: UnitContent = decode_json(bytes)?;
        Ok(Some(Joint { unit: content }))
    }

    fn main_chain_unit_at(&self, mci: u64) -> Result<Option<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .mc_index_db
            .get(&rtxn, &mci.to_be_bytes())
            .map_err(LmdbError::from)?
        {
            Some(unit) => Ok(Some(self.indexed_props(&rtxn, unit, "mc_index")?)),
            None => Ok(None),
        }
    }

    fn main_chain_child(&self, best_parent: &UnitHash) -> Result<Option<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .mc_children_db
            .get(&rtxn, best_parent.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(unit) => Ok(Some(self.indexed_props(&rtxn, unit, "mc_children")?)),
            None => Ok(None),
        }
    }

    fn latest_stabilizer(
        &self,
        last_ball_unit: &UnitHash,
    ) -> Result<Option<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = unit_prefix(last_ball_unit);
        let upper = increment_prefix(&prefix);
        let bounds = prefix_bounds(&prefix, &upper);
        let mut iter = self
            .last_balls_db
            .rev_range(&rtxn, &bounds)
            .map_err(LmdbError::from)?;
        match iter.next() {
            Some(entry) => {
                let (key, _) = entry.map_err(LmdbError::from)?;
                let unit = last_ball_stabilizer(key)?;
                Ok(Some(self.indexed_props(&rtxn, unit.as_bytes(), "last_balls")?))
            }
            None => Ok(None),
        }
    }

    fn units_before_rowid(&self, before: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let end = before.to_be_bytes();
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (Bound::Unbounded, Bound::Excluded(&end[..]));
        let mut units = Vec::with_capacity(limit.min(1024));
        for entry in self
            .rowids_db
            .rev_range(&rtxn, &bounds)
            .map_err(LmdbError::from)?
            .take(limit)
        {
            let (_, unit) = entry.map_err(LmdbError::from)?;
            units.push(self.indexed_props(&rtxn, unit, "rowids")?);
        }
        Ok(units)
    }

    fn units_after_rowid(&self, after: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let start = after.to_be_bytes();
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) = (Bound::Excluded(&start[..]), Bound::Unbounded);
        let mut units = Vec::with_capacity(limit.min(1024));
        for entry in self
            .rowids_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?
            .take(limit)
        {
            let (_, unit) = entry.map_err(LmdbError::from)?;
            units.push(self.indexed_props(&rtxn, unit, "rowids")?);
        }
        Ok(units)
    }

    fn unit_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.props_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
