//! LMDB implementation of ParenthoodStore.
//!
//! Edges are stored twice, once keyed `(child, parent)` and once keyed
//! `(parent, child)`, so both directions are a single prefix scan.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagview_store::{ParenthoodStore, StoreError};
use dagview_types::UnitHash;

use crate::keys::{increment_prefix, prefix_bounds, second_unit, unit_prefix};
use crate::LmdbError;

pub struct LmdbParenthoodStore {
    pub(crate) env: Arc<Env>,
    pub(crate) parents_db: Database<Bytes, Bytes>,
    pub(crate) children_db: Database<Bytes, Bytes>,
}

impl LmdbParenthoodStore {
    fn scan(db: &Database<Bytes, Bytes>, env: &Env, unit: &UnitHash) -> Result<Vec<UnitHash>, StoreError> {
        let rtxn = env.read_txn().map_err(LmdbError::from)?;
        let prefix = unit_prefix(unit);
        let upper = increment_prefix(&prefix);
        let bounds = prefix_bounds(&prefix, &upper);
        let mut units = Vec::new();
        for entry in db.range(&rtxn, &bounds).map_err(LmdbError::from)? {
            let (key, _) = entry.map_err(LmdbError::from)?;
            units.push(second_unit(key)?);
        }
        // Keys order by length prefix first; callers expect id order.
        units.sort();
        Ok(units)
    }
}

impl ParenthoodStore for LmdbParenthoodStore {
    fn parents_of(&self, child: &UnitHash) -> Result<Vec<UnitHash>, StoreError> {
        Self::scan(&self.parents_db, &self.env, child)
    }

    fn children_of(&self, parent: &UnitHash) -> Result<Vec<UnitHash>, StoreError> {
        Self::scan(&self.children_db, &self.env, parent)
    }
}
