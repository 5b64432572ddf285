//! Abstract read-side storage traits for the dagview explorer.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits. None of them
//! exposes a write path: the ledger engine owns the data.

pub mod aa;
pub mod asset;
pub mod author;
pub mod error;
pub mod ledger;
pub mod output;
pub mod parenthood;
pub mod snapshot;
pub mod unit;

pub use aa::AaResponseStore;
pub use asset::AssetStore;
pub use author::{AuthorStore, UnitAuthor};
pub use error::StoreError;
pub use ledger::{Ledger, LedgerSummary};
pub use output::{CommissionStore, OutputStore};
pub use parenthood::ParenthoodStore;
pub use snapshot::{LedgerSnapshot, StoredUnit};
pub use unit::UnitStore;
