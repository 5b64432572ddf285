//! HTTP API for the dagview explorer.
//!
//! Provides endpoints for:
//! - Graph listings by rowid
//! - Unit detail records
//! - Witness-majority confirmation delays
//! - Health and Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pagination;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, RpcServer, RpcSettings, RpcState};
