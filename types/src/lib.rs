//! Fundamental types for the dagview explorer.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: unit hashes, addresses, timestamps, stored unit properties and
//! content, outputs/inputs, and the witness parameters of the ledger engine.

pub mod aa;
pub mod address;
pub mod asset;
pub mod error;
pub mod joint;
pub mod output;
pub mod params;
pub mod props;
pub mod time;
pub mod unit;

pub use aa::AaResponse;
pub use address::Address;
pub use asset::AssetRecord;
pub use error::TypesError;
pub use joint::{Author, Joint, Message, UnitContent};
pub use output::{CommissionKind, CommissionOutput, Input, InputKind, Output};
pub use params::WitnessParams;
pub use props::{Sequence, UnitProps};
pub use time::Timestamp;
pub use unit::UnitHash;
