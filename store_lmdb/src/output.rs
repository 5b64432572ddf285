//! LMDB implementations of OutputStore and CommissionStore.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagview_store::{CommissionStore, OutputStore, StoreError};
use dagview_types::{Address, CommissionKind, Input, Output, UnitHash};

use crate::codec::decode;
use crate::keys::{commission_key, spend_key, unit_from_bytes};
use crate::LmdbError;

pub struct LmdbOutputStore {
    pub(crate) env: Arc<Env>,
    pub(crate) outputs_db: Database<Bytes, Bytes>,
    pub(crate) inputs_db: Database<Bytes, Bytes>,
    pub(crate) spends_db: Database<Bytes, Bytes>,
}

impl OutputStore for LmdbOutputStore {
    fn outputs_of(&self, unit: &UnitHash) -> Result<Vec<Output>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .outputs_db
            .get(&rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode(bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn inputs_of(&self, unit: &UnitHash) -> Result<Vec<Input>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self
            .inputs_db
            .get(&rtxn, unit.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(bytes) => Ok(decode(bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn spender_of(
        &self,
        src_unit: &UnitHash,
        message_index: u32,
        output_index: u32,
    ) -> Result<Option<UnitHash>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let key = spend_key(src_unit, message_index, output_index);
        match self.spends_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(unit_from_bytes(bytes)?)),
            None => Ok(None),
        }
    }
}

pub struct LmdbCommissionStore {
    pub(crate) env: Arc<Env>,
    pub(crate) commissions_db: Database<Bytes, Bytes>,
}

impl CommissionStore for LmdbCommissionStore {
    fn commission_sum(
        &self,
        kind: CommissionKind,
        address: &Address,
        from_mci: u64,
        to_mci: u64,
    ) -> Result<u64, StoreError> {
        if from_mci > to_mci {
            return Ok(0);
        }
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let start = commission_key(kind, address, from_mci);
        let end = commission_key(kind, address, to_mci);
        let bounds: (Bound<&[u8]>, Bound<&[u8]>) =
            (Bound::Included(start.as_slice()), Bound::Included(end.as_slice()));
        let mut sum = 0u64;
        for entry in self
            .commissions_db
            .range(&rtxn, &bounds)
            .map_err(LmdbError::from)?
        {
            let (_, value) = entry.map_err(LmdbError::from)?;
            let arr: [u8; 8] = value
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid commission amount length".into()))?;
            sum = sum.saturating_add(u64::from_be_bytes(arr));
        }
        Ok(sum)
    }
}
