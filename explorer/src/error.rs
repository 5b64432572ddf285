use dagview_store::StoreError;
use dagview_types::UnitHash;
use thiserror::Error;

/// Failures of an explorer computation.
///
/// "Not yet stable" and "quorum not reached" are not errors: they are
/// reported as absent confirmation times.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The ledger store failed to answer a query.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("inconsistent witness set for {unit}: {reason}")]
    InconsistentWitnessSet { unit: UnitHash, reason: String },

    #[error("unit not found: {0}")]
    UnitNotFound(UnitHash),

    #[error("computation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
