//! LMDB implementation of AuthorStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};
use serde_json::Value;

use dagview_store::{AuthorStore, StoreError, UnitAuthor};
use dagview_types::{Address, UnitHash};

use crate::codec::{decode, decode_json};
use crate::LmdbError;

pub struct LmdbAuthorStore {
    pub(crate) env: Arc<Env>,
    pub(crate) authors_db: Database<Bytes, Bytes>,
    pub(crate) witnesses_db: Database<Bytes, Bytes>,
    pub(crate) definitions_db: Database<Bytes, Bytes>,
}

impl AuthorStore for LmdbAuthorStore {
    fn authors_of(&self, unit: &UnitHash) -> Result<Vec<UnitAuthor>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .authors_db
            .get(&rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode(bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn definition(&self, definition_chash: &str) -> Result<Option<Value>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .definitions_db
            .get(&rtxn, definition_chash.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode_json(bytes)?)),
            None => Ok(None),
        }
    }

    fn unit_witnesses(&self, unit: &UnitHash) -> Result<Vec<Address>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .witnesses_db
            .get(&rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode(bytes)?),
            None => Ok(Vec::new()),
        }
    }
}
