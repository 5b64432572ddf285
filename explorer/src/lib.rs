//! Read-side analytics over the DAG ledger.
//!
//! The core is the confirmation-delay resolver: [`StabilizationLocator`]
//! finds the main-chain unit that stabilized a unit, and
//! [`ConfirmationTracer`] walks down the main chain from there until a
//! majority of witnesses has been seen. Around it, [`Explorer`] offers the
//! graph listings and per-unit detail records served to clients.

pub mod assets;
pub mod cancel;
pub mod confirmation;
pub mod delay;
pub mod details;
pub mod error;
pub mod explorer;
pub mod graph;
pub mod locator;
pub mod tracer;
pub mod unit_info;
pub mod walker;
pub mod witness;

pub use assets::{decorate_payment_messages, AssetNameResolver, LedgerAssetNames};
pub use cancel::CancelToken;
pub use confirmation::ConfirmationResolver;
pub use delay::ConfirmationDelays;
pub use details::{
    CommissionSummary, ParentsAndChildren, TransferInfo, UnitCommissions, UnitOutput,
};
pub use error::{ExplorerError, ExplorerResult};
pub use explorer::{Explorer, ExplorerSettings};
pub use graph::{GraphEdge, GraphNode, GraphView, StableUnit};
pub use locator::StabilizationLocator;
pub use tracer::{ConfirmationTimes, ConfirmationTracer, WitnessTally};
pub use unit_info::UnitInfo;
pub use walker::{MainChainStep, MainChainWalker};
pub use witness::{validate_witness_set, LedgerWitnessResolver, WitnessResolver};
