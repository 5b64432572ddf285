//! LMDB implementation of AssetStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagview_store::{AssetStore, StoreError};
use dagview_types::{AssetRecord, UnitHash};

use crate::codec::decode;
use crate::LmdbError;

pub struct LmdbAssetStore {
    pub(crate) env: Arc<Env>,
    pub(crate) assets_db: Database<Bytes, Bytes>,
}

impl AssetStore for LmdbAssetStore {
    fn get_asset(&self, asset: &UnitHash) -> Result<Option<AssetRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .assets_db
            .get(&rtxn, asset.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Ok(None),
        }
    }
}
