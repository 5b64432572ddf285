//! LMDB implementation of AaResponseStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagview_store::{AaResponseStore, StoreError};
use dagview_types::{AaResponse, UnitHash};

use crate::codec::decode;
use crate::keys::{increment_prefix, prefix_bounds, unit_from_bytes, unit_prefix};
use crate::LmdbError;

pub struct LmdbAaResponseStore {
    pub(crate) env: Arc<Env>,
    pub(crate) aa_responses_db: Database<Bytes, Bytes>,
    pub(crate) aa_triggers_db: Database<Bytes, Bytes>,
}

impl AaResponseStore for LmdbAaResponseStore {
    fn responses_to(&self, trigger_unit: &UnitHash) -> Result<Vec<AaResponse>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let prefix = unit_prefix(trigger_unit);
        let upper = increment_prefix(&prefix);
        let bounds = prefix_bounds(&prefix, &upper);
        let mut responses: Vec<AaResponse> = Vec::new();
        for entry in self
            .aa_responses_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?
        {
            let (_, value) = entry.map_err(LmdbError::from)?;
            responses.push(decode(value)?);
        }
        responses.sort_by(|a, b| a.aa_address.cmp(&b.aa_address));
        Ok(responses)
    }

    fn trigger_of(&self, response_unit: &UnitHash) -> Result<Option<UnitHash>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .aa_triggers_db
            .get(&rtxn, response_unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(unit_from_bytes(bytes)?)),
            None => Ok(None),
        }
    }
}
