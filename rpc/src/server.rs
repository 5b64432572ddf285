//! Axum-based HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use dagview_explorer::Explorer;
use dagview_store::Ledger;

use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Per-request limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcSettings {
    /// Deadline for a single request's ledger work.
    pub query_timeout: Duration,
    /// Page size used when a listing request names none.
    pub last_units_limit: usize,
    pub max_page_limit: usize,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_millis(10_000),
            last_units_limit: DEFAULT_PAGE_SIZE,
            max_page_limit: MAX_PAGE_SIZE,
        }
    }
}

/// State shared by every handler.
pub struct RpcState<L> {
    pub explorer: Explorer<L>,
    pub metrics: Arc<RpcMetrics>,
    pub settings: RpcSettings,
}

impl<L> RpcState<L> {
    pub fn new(explorer: Explorer<L>, metrics: Arc<RpcMetrics>, settings: RpcSettings) -> Self {
        Self {
            explorer,
            metrics,
            settings,
        }
    }
}

/// Build the API router.
pub fn router<L>(state: Arc<RpcState<L>>) -> Router
where
    L: Ledger + Send + Sync + 'static,
{
    let api = Router::new()
        .route("/units/last", get(handlers::last_units::<L>))
        .route("/units/before/:rowid", get(handlers::units_before::<L>))
        .route("/units/after/:rowid", get(handlers::units_after::<L>))
        .route("/units/stable", post(handlers::stable_units::<L>))
        .route("/units/:unit", get(handlers::unit_info::<L>))
        .route("/units/:unit/rowid", get(handlers::rowid::<L>))
        .route("/units/:unit/trigger", get(handlers::trigger::<L>))
        .route("/units/:unit/confirmation", get(handlers::confirmation::<L>));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics::<L>))
        .nest("/api/v1", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
}

impl RpcServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Serve `router` until `shutdown` resolves.
    pub async fn start(
        &self,
        router: Router,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), RpcError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| RpcError::Internal(format!("bind {}: {e}", self.addr)))?;
        let local = listener
            .local_addr()
            .map_err(|e| RpcError::Internal(e.to_string()))?;
        info!(addr = %local, "RPC server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RpcError::Internal(e.to_string()))?;
        info!("RPC server stopped");
        Ok(())
    }
}
