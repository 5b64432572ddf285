//! Nullable store: thread-safe in-memory ledger for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use dagview_store::{
    AaResponseStore, AssetStore, AuthorStore, CommissionStore, Ledger, LedgerSnapshot,
    OutputStore, ParenthoodStore, StoreError, StoredUnit, UnitAuthor, UnitStore,
};
use dagview_types::{
    AaResponse, Address, AssetRecord, CommissionKind, CommissionOutput, Input, InputKind, Joint,
    Output, UnitContent, UnitHash, UnitProps,
};
use serde_json::Value;

#[derive(Default)]
struct Tables {
    props: HashMap<UnitHash, UnitProps>,
    contents: HashMap<UnitHash, UnitContent>,
    parents: HashMap<UnitHash, Vec<UnitHash>>,
    children: HashMap<UnitHash, Vec<UnitHash>>,
    authors: HashMap<UnitHash, Vec<UnitAuthor>>,
    witnesses: HashMap<UnitHash, Vec<Address>>,
    outputs: HashMap<UnitHash, Vec<Output>>,
    inputs: HashMap<UnitHash, Vec<Input>>,
    spends: HashMap<(UnitHash, u32, u32), UnitHash>,
    commissions: Vec<CommissionOutput>,
    aa_by_trigger: HashMap<UnitHash, Vec<AaResponse>>,
    trigger_by_response: HashMap<UnitHash, UnitHash>,
    assets: HashMap<UnitHash, AssetRecord>,
    definitions: HashMap<String, Value>,
}

/// An in-memory implementation of every ledger store trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Every trait method counts as one query. [`NullStore::fail_after`] makes
/// queries beyond a budget return [`StoreError::Unavailable`], which is how
/// tests simulate a store dropping out mid-traversal.
pub struct NullStore {
    tables: Mutex<Tables>,
    queries: AtomicU64,
    fail_after: AtomicU64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            queries: AtomicU64::new(0),
            fail_after: AtomicU64::new(u64::MAX),
        }
    }

    /// Build a store holding everything in `snapshot`.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, StoreError> {
        snapshot.validate()?;
        let store = Self::new();
        for unit in &snapshot.units {
            store.insert_unit(unit.clone());
        }
        let mut tables = store.tables.lock().unwrap();
        tables
            .commissions
            .extend(snapshot.commission_outputs.iter().cloned());
        for response in &snapshot.aa_responses {
            if let Some(response_unit) = &response.response_unit {
                tables
                    .trigger_by_response
                    .insert(response_unit.clone(), response.trigger_unit.clone());
            }
            let list = tables
                .aa_by_trigger
                .entry(response.trigger_unit.clone())
                .or_default();
            list.push(response.clone());
            list.sort_by(|a, b| a.aa_address.cmp(&b.aa_address));
        }
        for asset in &snapshot.assets {
            tables.assets.insert(asset.asset.clone(), asset.clone());
        }
        for (chash, definition) in &snapshot.definitions {
            tables.definitions.insert(chash.clone(), definition.clone());
        }
        drop(tables);
        Ok(store)
    }

    /// Add (or replace) a unit, simulating the ledger engine appending to
    /// the DAG while the explorer is running.
    pub fn insert_unit(&self, stored: StoredUnit) {
        let mut tables = self.tables.lock().unwrap();
        let unit = stored.props.unit.clone();

        for parent in &stored.parents {
            let children = tables.children.entry(parent.clone()).or_default();
            if !children.contains(&unit) {
                children.push(unit.clone());
                children.sort();
            }
        }
        let mut parents = stored.parents.clone();
        parents.sort();
        parents.dedup();
        tables.parents.insert(unit.clone(), parents);

        for input in &stored.inputs {
            if let InputKind::Transfer {
                src_unit,
                src_message_index,
                src_output_index,
            } = &input.kind
            {
                tables.spends.insert(
                    (src_unit.clone(), *src_message_index, *src_output_index),
                    unit.clone(),
                );
            }
        }

        let mut authors = stored.authors;
        authors.sort_by(|a, b| a.address.cmp(&b.address));
        tables.authors.insert(unit.clone(), authors);
        if !stored.witnesses.is_empty() {
            tables.witnesses.insert(unit.clone(), stored.witnesses);
        }
        let mut outputs = stored.outputs;
        outputs.sort_by_key(|o| (o.message_index, o.output_index));
        tables.outputs.insert(unit.clone(), outputs);
        let mut inputs = stored.inputs;
        inputs.sort_by_key(|i| (i.message_index, i.input_index));
        tables.inputs.insert(unit.clone(), inputs);
        tables.contents.insert(unit.clone(), stored.content);
        tables.props.insert(unit, stored.props);
    }

    /// Number of store queries answered (or refused) so far.
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn reset_query_count(&self) {
        self.queries.store(0, Ordering::SeqCst);
    }

    /// Answer the next `n` queries, then fail every later one with
    /// [`StoreError::Unavailable`].
    pub fn fail_after(&self, n: u64) {
        let already = self.queries.load(Ordering::SeqCst);
        self.fail_after
            .store(already.saturating_add(n), Ordering::SeqCst);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        self.fail_after.store(u64::MAX, Ordering::SeqCst);
    }

    fn begin_query(&self) -> Result<(), StoreError> {
        let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        if n > self.fail_after.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "injected failure on query {n}"
            )));
        }
        Ok(())
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitStore for NullStore {
    fn get_props(&self, unit: &UnitHash) -> Result<Option<UnitProps>, StoreError> {
        self.begin_query()?;
        Ok(self.tables.lock().unwrap().props.get(unit).cloned())
    }

    fn read_joint(&self, unit: &UnitHash) -> Result<Option<Joint>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .contents
            .get(unit)
            .cloned()
            .map(|unit| Joint { unit }))
    }

    fn main_chain_unit_at(&self, mci: u64) -> Result<Option<UnitProps>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .props
            .values()
            .find(|p| p.is_on_main_chain && p.main_chain_index == Some(mci))
            .cloned())
    }

    fn main_chain_child(&self, best_parent: &UnitHash) -> Result<Option<UnitProps>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .props
            .values()
            .filter(|p| p.is_on_main_chain && p.best_parent_unit.as_ref() == Some(best_parent))
            .min_by(|a, b| {
                (a.main_chain_index, &a.unit).cmp(&(b.main_chain_index, &b.unit))
            })
            .cloned())
    }

    fn latest_stabilizer(
        &self,
        last_ball_unit: &UnitHash,
    ) -> Result<Option<UnitProps>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .props
            .values()
            .filter(|p| p.is_on_main_chain && p.last_ball_unit.as_ref() == Some(last_ball_unit))
            .max_by(|a, b| {
                (a.main_chain_index, &a.unit).cmp(&(b.main_chain_index, &b.unit))
            })
            .cloned())
    }

    fn units_before_rowid(&self, before: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError> {
        self.begin_query()?;
        let tables = self.tables.lock().unwrap();
        let mut units: Vec<UnitProps> = tables
            .props
            .values()
            .filter(|p| p.rowid < before)
            .cloned()
            .collect();
        units.sort_by(|a, b| b.rowid.cmp(&a.rowid));
        units.truncate(limit);
        Ok(units)
    }

    fn units_after_rowid(&self, after: u64, limit: usize) -> Result<Vec<UnitProps>, StoreError> {
        self.begin_query()?;
        let tables = self.tables.lock().unwrap();
        let mut units: Vec<UnitProps> = tables
            .props
            .values()
            .filter(|p| p.rowid > after)
            .cloned()
            .collect();
        units.sort_by_key(|p| p.rowid);
        units.truncate(limit);
        Ok(units)
    }

    fn unit_count(&self) -> Result<u64, StoreError> {
        self.begin_query()?;
        Ok(self.tables.lock().unwrap().props.len() as u64)
    }
}

impl ParenthoodStore for NullStore {
    fn parents_of(&self, child: &UnitHash) -> Result<Vec<UnitHash>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .parents
            .get(child)
            .cloned()
            .unwrap_or_default())
    }

    fn children_of(&self, parent: &UnitHash) -> Result<Vec<UnitHash>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .children
            .get(parent)
            .cloned()
            .unwrap_or_default())
    }
}

impl AuthorStore for NullStore {
    fn authors_of(&self, unit: &UnitHash) -> Result<Vec<UnitAuthor>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .authors
            .get(unit)
            .cloned()
            .unwrap_or_default())
    }

    fn definition(&self, definition_chash: &str) -> Result<Option<Value>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .definitions
            .get(definition_chash)
            .cloned())
    }

    fn unit_witnesses(&self, unit: &UnitHash) -> Result<Vec<Address>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .witnesses
            .get(unit)
            .cloned()
            .unwrap_or_default())
    }
}

impl OutputStore for NullStore {
    fn outputs_of(&self, unit: &UnitHash) -> Result<Vec<Output>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .outputs
            .get(unit)
            .cloned()
            .unwrap_or_default())
    }

    fn inputs_of(&self, unit: &UnitHash) -> Result<Vec<Input>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .inputs
            .get(unit)
            .cloned()
            .unwrap_or_default())
    }

    fn spender_of(
        &self,
        src_unit: &UnitHash,
        message_index: u32,
        output_index: u32,
    ) -> Result<Option<UnitHash>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .spends
            .get(&(src_unit.clone(), message_index, output_index))
            .cloned())
    }
}

impl CommissionStore for NullStore {
    fn commission_sum(
        &self,
        kind: CommissionKind,
        address: &Address,
        from_mci: u64,
        to_mci: u64,
    ) -> Result<u64, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .commissions
            .iter()
            .filter(|c| {
                c.kind == kind
                    && &c.address == address
                    && (from_mci..=to_mci).contains(&c.main_chain_index)
            })
            .map(|c| c.amount)
            .sum())
    }
}

impl AaResponseStore for NullStore {
    fn responses_to(&self, trigger_unit: &UnitHash) -> Result<Vec<AaResponse>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .aa_by_trigger
            .get(trigger_unit)
            .cloned()
            .unwrap_or_default())
    }

    fn trigger_of(&self, response_unit: &UnitHash) -> Result<Option<UnitHash>, StoreError> {
        self.begin_query()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .trigger_by_response
            .get(response_unit)
            .cloned())
    }
}

impl AssetStore for NullStore {
    fn get_asset(&self, asset: &UnitHash) -> Result<Option<AssetRecord>, StoreError> {
        self.begin_query()?;
        Ok(self.tables.lock().unwrap().assets.get(asset).cloned())
    }
}

impl Ledger for NullStore {
    type Units = Self;
    type Parenthoods = Self;
    type Authors = Self;
    type Outputs = Self;
    type Commissions = Self;
    type AaResponses = Self;
    type Assets = Self;

    fn unit_store(&self) -> &Self {
        self
    }

    fn parenthood_store(&self) -> &Self {
        self
    }

    fn author_store(&self) -> &Self {
        self
    }

    fn output_store(&self) -> &Self {
        self
    }

    fn commission_store(&self) -> &Self {
        self
    }

    fn aa_response_store(&self) -> &Self {
        self
    }

    fn asset_store(&self) -> &Self {
        self
    }
}
