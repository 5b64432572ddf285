//! LMDB storage backend for the dagview explorer.
//!
//! Implements all read-store traits from `dagview-store` using the `heed`
//! LMDB bindings. Each logical store maps to one or more LMDB databases
//! within a single environment; [`LmdbEnvironment::import_snapshot`] is the
//! only write path.

pub mod aa;
pub mod asset;
pub mod author;
mod codec;
pub mod environment;
pub mod error;
pub mod import;
pub mod integrity;
mod keys;
pub mod output;
pub mod parenthood;
pub mod unit;
pub mod write_batch;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use import::ImportReport;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
