//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::info;

use dagview_store::{Ledger, StoreError};

use crate::aa::LmdbAaResponseStore;
use crate::asset::LmdbAssetStore;
use crate::author::LmdbAuthorStore;
use crate::output::{LmdbCommissionStore, LmdbOutputStore};
use crate::parenthood::LmdbParenthoodStore;
use crate::unit::LmdbUnitStore;
use crate::write_batch::WriteBatch;
use crate::LmdbError;

/// Layout version of the databases below.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

/// Every named database in the environment.
pub const DATABASES: &[&str] = &[
    "props",
    "joints",
    "rowids",
    "mc_index",
    "mc_children",
    "last_balls",
    "parents",
    "children",
    "authors",
    "witnesses",
    "definitions",
    "outputs",
    "inputs",
    "spends",
    "commissions",
    "aa_responses",
    "aa_triggers",
    "assets",
    "meta",
];

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// unit → bincode `UnitProps`
    pub(crate) props_db: Database<Bytes, Bytes>,
    /// unit → JSON `UnitContent`
    pub(crate) joints_db: Database<Bytes, Bytes>,
    /// rowid_be → unit
    pub(crate) rowids_db: Database<Bytes, Bytes>,
    /// mci_be → main-chain unit
    pub(crate) mc_index_db: Database<Bytes, Bytes>,
    /// best parent → main-chain child
    pub(crate) mc_children_db: Database<Bytes, Bytes>,
    /// (last ball, mci, unit) → empty, main-chain units only
    pub(crate) last_balls_db: Database<Bytes, Bytes>,
    /// (child, parent) → empty
    pub(crate) parents_db: Database<Bytes, Bytes>,
    /// (parent, child) → empty
    pub(crate) children_db: Database<Bytes, Bytes>,
    /// unit → bincode `Vec<UnitAuthor>`
    pub(crate) authors_db: Database<Bytes, Bytes>,
    /// unit → bincode `Vec<Address>`
    pub(crate) witnesses_db: Database<Bytes, Bytes>,
    /// definition chash → JSON definition
    pub(crate) definitions_db: Database<Bytes, Bytes>,
    /// unit → bincode `Vec<Output>`
    pub(crate) outputs_db: Database<Bytes, Bytes>,
    /// unit → bincode `Vec<Input>`
    pub(crate) inputs_db: Database<Bytes, Bytes>,
    /// (src unit, message index, output index) → spending unit
    pub(crate) spends_db: Database<Bytes, Bytes>,
    /// (kind, address, mci) → amount_be
    pub(crate) commissions_db: Database<Bytes, Bytes>,
    /// (trigger, aa address) → bincode `AaResponse`
    pub(crate) aa_responses_db: Database<Bytes, Bytes>,
    /// response unit → trigger unit
    pub(crate) aa_triggers_db: Database<Bytes, Bytes>,
    /// asset → bincode `AssetRecord`
    pub(crate) assets_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,

    units: LmdbUnitStore,
    parenthoods: LmdbParenthoodStore,
    authors: LmdbAuthorStore,
    outputs: LmdbOutputStore,
    commissions: LmdbCommissionStore,
    aa_responses: LmdbAaResponseStore,
    assets: LmdbAssetStore,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("{}: {e}", path.display())))?;
        // SAFETY: the environment is opened once per path within this
        // process and never mapped by another process with different flags.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs)
                .open(path)
        }?;
        let env = Arc::new(env);

        let mut wtxn = env.write_txn()?;
        let mut open = |name: &str| env.create_database::<Bytes, Bytes>(&mut wtxn, Some(name));
        let props_db = open("props")?;
        let joints_db = open("joints")?;
        let rowids_db = open("rowids")?;
        let mc_index_db = open("mc_index")?;
        let mc_children_db = open("mc_children")?;
        let last_balls_db = open("last_balls")?;
        let parents_db = open("parents")?;
        let children_db = open("children")?;
        let authors_db = open("authors")?;
        let witnesses_db = open("witnesses")?;
        let definitions_db = open("definitions")?;
        let outputs_db = open("outputs")?;
        let inputs_db = open("inputs")?;
        let spends_db = open("spends")?;
        let commissions_db = open("commissions")?;
        let aa_responses_db = open("aa_responses")?;
        let aa_triggers_db = open("aa_triggers")?;
        let assets_db = open("assets")?;
        let meta_db = open("meta")?;

        let stored_version = match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) => {
                let arr: [u8; 4] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("schema_version has unexpected byte length".into())
                })?;
                Some(u32::from_be_bytes(arr))
            }
            None => None,
        };
        match stored_version {
            Some(version) if version > SCHEMA_VERSION => {
                return Err(LmdbError::Heed(format!(
                    "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
                )));
            }
            Some(_) => {}
            None => meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_be_bytes())?,
        }
        wtxn.commit()?;
        info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            units: LmdbUnitStore {
                env: Arc::clone(&env),
                props_db,
                joints_db,
                rowids_db,
                mc_index_db,
                mc_children_db,
                last_balls_db,
            },
            parenthoods: LmdbParenthoodStore {
                env: Arc::clone(&env),
                parents_db,
                children_db,
            },
            authors: LmdbAuthorStore {
                env: Arc::clone(&env),
                authors_db,
                witnesses_db,
                definitions_db,
            },
            outputs: LmdbOutputStore {
                env: Arc::clone(&env),
                outputs_db,
                inputs_db,
                spends_db,
            },
            commissions: LmdbCommissionStore {
                env: Arc::clone(&env),
                commissions_db,
            },
            aa_responses: LmdbAaResponseStore {
                env: Arc::clone(&env),
                aa_responses_db,
                aa_triggers_db,
            },
            assets: LmdbAssetStore {
                env: Arc::clone(&env),
                assets_db,
            },
            env,
            props_db,
            joints_db,
            rowids_db,
            mc_index_db,
            mc_children_db,
            last_balls_db,
            parents_db,
            children_db,
            authors_db,
            witnesses_db,
            definitions_db,
            outputs_db,
            inputs_db,
            spends_db,
            commissions_db,
            aa_responses_db,
            aa_triggers_db,
            assets_db,
            meta_db,
        })
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    /// Begin a write batch: one write transaction committed at once.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }
}

impl Ledger for LmdbEnvironment {
    type Units = LmdbUnitStore;
    type Parenthoods = LmdbParenthoodStore;
    type Authors = LmdbAuthorStore;
    type Outputs = LmdbOutputStore;
    type Commissions = LmdbCommissionStore;
    type AaResponses = LmdbAaResponseStore;
    type Assets = LmdbAssetStore;

    fn unit_store(&self) -> &LmdbUnitStore {
        &self.units
    }

    fn parenthood_store(&self) -> &LmdbParenthoodStore {
        &self.parenthoods
    }

    fn author_store(&self) -> &LmdbAuthorStore {
        &self.authors
    }

    fn output_store(&self) -> &LmdbOutputStore {
        &self.outputs
    }

    fn commission_store(&self) -> &LmdbCommissionStore {
        &self.commissions
    }

    fn aa_response_store(&self) -> &LmdbAaResponseStore {
        &self.aa_responses
    }

    fn asset_store(&self) -> &LmdbAssetStore {
        &self.assets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directory_and_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db");
        let env = LmdbEnvironment::open(&path, 32, 1 << 20).unwrap();
        let rtxn = env.env().read_txn().unwrap();
        let version = env.meta_db.get(&rtxn, SCHEMA_VERSION_KEY).unwrap().unwrap();
        assert_eq!(version, SCHEMA_VERSION.to_be_bytes());
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        {
            let env = LmdbEnvironment::open(dir.path(), 32, 1 << 20).unwrap();
            let mut wtxn = env.env().write_txn().unwrap();
            env.meta_db
                .put(&mut wtxn, SCHEMA_VERSION_KEY, &(SCHEMA_VERSION + 1).to_be_bytes())
                .unwrap();
            wtxn.commit().unwrap();
        }
        assert!(LmdbEnvironment::open(dir.path(), 32, 1 << 20).is_err());
    }
}
