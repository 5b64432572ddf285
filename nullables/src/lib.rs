//! Nullable infrastructure for deterministic testing.
//!
//! The explorer reads the ledger only through the `dagview-store` traits.
//! This crate provides an implementation of those traits that:
//! - Lives entirely in memory and never touches the filesystem
//! - Can be populated from a [`dagview_store::LedgerSnapshot`]
//! - Counts queries and can be told to start failing after N of them
//!
//! Usage: swap the LMDB environment for a [`NullStore`] in tests.

pub mod fixture;
pub mod store;

pub use fixture::{witness_addresses, UnitFixture};
pub use store::NullStore;
