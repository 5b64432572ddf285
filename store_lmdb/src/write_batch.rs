//! Write batching: groups every index update of an import into a single
//! LMDB write transaction.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put_unit(&stored)?;
//! batch.put_commission(&commission)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;
use serde_json::Value;

use dagview_store::{StoreError, StoredUnit};
use dagview_types::{AaResponse, AssetRecord, CommissionOutput, InputKind, UnitHash, UnitProps};

use crate::codec::{decode, encode, encode_json};
use crate::environment::LmdbEnvironment;
use crate::keys::{
    aa_response_key, commission_key, last_ball_key, spend_key, unit_from_bytes, unit_pair_key,
};
use crate::LmdbError;

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env })
    }

    /// Whether `unit` is already stored, including writes made earlier in
    /// this batch.
    pub fn contains_unit(&self, unit: &UnitHash) -> Result<bool, StoreError> {
        let found = self
            .env
            .props_db
            .get(&self.txn, unit.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(found.is_some())
    }

    /// Store a unit and every index derived from it.
    pub fn put_unit(&mut self, stored: &StoredUnit) -> Result<(), StoreError> {
        let props = &stored.props;
        let unit = props.unit.as_bytes();
        let env = self.env;

        env.props_db
            .put(&mut self.txn, unit, &encode(props)?)
            .map_err(LmdbError::from)?;
        env.joints_db
            .put(&mut self.txn, unit, &encode_json(&stored.content)?)
            .map_err(LmdbError::from)?;
        env.rowids_db
            .put(&mut self.txn, &props.rowid.to_be_bytes(), unit)
            .map_err(LmdbError::from)?;

        if props.is_on_main_chain {
            self.put_main_chain_indices(props)?;
        }

        for parent in &stored.parents {
            env.parents_db
                .put(&mut self.txn, &unit_pair_key(&props.unit, parent), &[])
                .map_err(LmdbError::from)?;
            env.children_db
                .put(&mut self.txn, &unit_pair_key(parent, &props.unit), &[])
                .map_err(LmdbError::from)?;
        }

        let mut authors = stored.authors.clone();
        authors.sort_by(|a, b| a.address.cmp(&b.address));
        env.authors_db
            .put(&mut self.txn, unit, &encode(&authors)?)
            .map_err(LmdbError::from)?;
        if !stored.witnesses.is_empty() {
            env.witnesses_db
                .put(&mut self.txn, unit, &encode(&stored.witnesses)?)
                .map_err(LmdbError::from)?;
        }

        let mut outputs = stored.outputs.clone();
        outputs.sort_by_key(|o| (o.message_index, o.output_index));
        env.outputs_db
            .put(&mut self.txn, unit, &encode(&outputs)?)
            .map_err(LmdbError::from)?;

        let mut inputs = stored.inputs.clone();
        inputs.sort_by_key(|i| (i.message_index, i.input_index));
        for input in &inputs {
            if let InputKind::Transfer {
                src_unit,
                src_message_index,
                src_output_index,
            } = &input.kind
            {
                let key = spend_key(src_unit, *src_message_index, *src_output_index);
                env.spends_db
                    .put(&mut self.txn, &key, unit)
                    .map_err(LmdbError::from)?;
            }
        }
        env.inputs_db
            .put(&mut self.txn, unit, &encode(&inputs)?)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_main_chain_indices(&mut self, props: &UnitProps) -> Result<(), StoreError> {
        let env = self.env;
        let unit = props.unit.as_bytes();
        let mci = props.main_chain_index.ok_or_else(|| {
            StoreError::Corruption(format!(
                "main-chain unit {} has no main-chain index",
                props.unit
            ))
        })?;
        env.mc_index_db
            .put(&mut self.txn, &mci.to_be_bytes(), unit)
            .map_err(LmdbError::from)?;

        if let Some(best_parent) = &props.best_parent_unit {
            // Only one main-chain unit may follow a best parent; keep the
            // lowest index if the dump disagrees.
            let existing = env
                .mc_children_db
                .get(&self.txn, best_parent.as_bytes())
                .map_err(LmdbError::from)?
                .map(unit_from_bytes)
                .transpose()?;
            let keep_existing = match existing {
                Some(other) => match env
                    .props_db
                    .get(&self.txn, other.as_bytes())
                    .map_err(LmdbError::from)?
                {
                    Some(bytes) => {
                        let other: UnitProps = decode(bytes)?;
                        (other.main_chain_index, &other.unit) < (Some(mci), &props.unit)
                    }
                    None => false,
                },
                None => false,
            };
            if !keep_existing {
                env.mc_children_db
                    .put(&mut self.txn, best_parent.as_bytes(), unit)
                    .map_err(LmdbError::from)?;
            }
        }

        if let Some(last_ball_unit) = &props.last_ball_unit {
            env.last_balls_db
                .put(&mut self.txn, &last_ball_key(last_ball_unit, mci, &props.unit), &[])
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    /// Credit a commission; amounts at the same `(kind, address, mci)` add up.
    pub fn put_commission(&mut self, commission: &CommissionOutput) -> Result<(), StoreError> {
        let key = commission_key(
            commission.kind,
            &commission.address,
            commission.main_chain_index,
        );
        let previous = match self
            .env
            .commissions_db
            .get(&self.txn, &key)
            .map_err(LmdbError::from)?
        {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("invalid commission amount length".into())
                })?;
                u64::from_be_bytes(arr)
            }
            None => 0,
        };
        let total = previous.saturating_add(commission.amount);
        self.env
            .commissions_db
            .put(&mut self.txn, &key, &total.to_be_bytes())
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn put_aa_response(&mut self, response: &AaResponse) -> Result<(), StoreError> {
        let key = aa_response_key(&response.trigger_unit, &response.aa_address);
        self.env
            .aa_responses_db
            .put(&mut self.txn, &key, &encode(response)?)
            .map_err(LmdbError::from)?;
        if let Some(response_unit) = &response.response_unit {
            self.env
                .aa_triggers_db
                .put(
                    &mut self.txn,
                    response_unit.as_bytes(),
                    response.trigger_unit.as_bytes(),
                )
                .map_err(LmdbError::from)?;
        }
        Ok(())
    }

    pub fn put_asset(&mut self, asset: &AssetRecord) -> Result<(), StoreError> {
        self.env
            .assets_db
            .put(&mut self.txn, asset.asset.as_bytes(), &encode(asset)?)
            .map_err(LmdbError::from)?;
        Ok(())
    }

    pub fn put_definition(
        &mut self,
        definition_chash: &str,
        definition: &Value,
    ) -> Result<(), StoreError> {
        self.env
            .definitions_db
            .put(
                &mut self.txn,
                definition_chash.as_bytes(),
                &encode_json(definition)?,
            )
            .map_err(LmdbError::from)?;
        Ok(())
    }

    /// Commit all batched operations atomically.
    pub fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
