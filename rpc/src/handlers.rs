//! HTTP request handlers.
//!
//! Every handler that touches the ledger runs the explorer call on the
//! blocking pool: the store traits are synchronous and a single confirmation
//! trace may issue many reads.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use dagview_explorer::{
    CancelToken, ConfirmationDelays, Explorer, ExplorerResult, GraphView, StableUnit, UnitInfo,
};
use dagview_store::Ledger;
use dagview_types::UnitHash;
use dagview_utils::spans::rpc_span;

use crate::error::RpcError;
use crate::pagination::LimitParams;
use crate::server::RpcState;

#[derive(Debug, Deserialize)]
pub struct StableUnitsRequest {
    pub units: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RowidResponse {
    pub rowid: u64,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub trigger_unit: Option<UnitHash>,
}

fn parse_unit(raw: &str) -> Result<UnitHash, RpcError> {
    Ok(UnitHash::parse(raw)?)
}

/// Run `f` against the explorer on the blocking pool under the request's
/// deadline, counting the request and its failure (if any) under `route`.
async fn run<L, T, F>(state: &Arc<RpcState<L>>, route: &'static str, f: F) -> Result<T, RpcError>
where
    L: Ledger + Send + Sync + 'static,
    T: Send + 'static,
    F: FnOnce(&Explorer<L>, &CancelToken) -> ExplorerResult<T> + Send + 'static,
{
    state.metrics.record_request(route);
    let explorer = state.explorer.clone();
    let cancel = CancelToken::with_timeout(state.settings.query_timeout);
    let span = rpc_span(route);
    let result = tokio::task::spawn_blocking(move || {
        let _enter = span.enter();
        f(&explorer, &cancel)
    })
    .await
    .map_err(RpcError::from)
    .and_then(|r| r.map_err(RpcError::from));
    if let Err(e) = &result {
        state.metrics.record_failure(route);
        warn!(route, error = %e, "request failed");
    }
    result
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn metrics<L>(State(state): State<Arc<RpcState<L>>>) -> Result<impl IntoResponse, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let body = state
        .metrics
        .encode()
        .map_err(|e| RpcError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

pub async fn last_units<L>(
    State(state): State<Arc<RpcState<L>>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<GraphView>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let limit = params.effective_limit(
        state.settings.last_units_limit,
        state.settings.max_page_limit,
    );
    let view = run(&state, "last_units", move |explorer, _| {
        explorer.last_units(limit)
    })
    .await?;
    Ok(Json(view))
}

pub async fn units_before<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(rowid): Path<u64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<GraphView>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let limit = params.effective_limit(
        state.settings.last_units_limit,
        state.settings.max_page_limit,
    );
    let view = run(&state, "units_before", move |explorer, _| {
        explorer.units_before_rowid(rowid, limit)
    })
    .await?;
    Ok(Json(view))
}

pub async fn units_after<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(rowid): Path<u64>,
    Query(params): Query<LimitParams>,
) -> Result<Json<GraphView>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let limit = params.effective_limit(
        state.settings.last_units_limit,
        state.settings.max_page_limit,
    );
    let view = run(&state, "units_after", move |explorer, _| {
        explorer.units_after_rowid(rowid, limit)
    })
    .await?;
    Ok(Json(view))
}

pub async fn stable_units<L>(
    State(state): State<Arc<RpcState<L>>>,
    Json(request): Json<StableUnitsRequest>,
) -> Result<Json<Vec<StableUnit>>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    if request.units.len() > state.settings.max_page_limit {
        return Err(RpcError::InvalidRequest(format!(
            "at most {} units per request",
            state.settings.max_page_limit
        )));
    }
    let units = request
        .units
        .iter()
        .map(|u| parse_unit(u))
        .collect::<Result<Vec<_>, _>>()?;
    let stable = run(&state, "stable_units", move |explorer, _| {
        explorer.units_that_became_stable(&units)
    })
    .await?;
    Ok(Json(stable))
}

pub async fn unit_info<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(unit): Path<String>,
) -> Result<Json<UnitInfo>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let unit = parse_unit(&unit)?;
    let lookup = unit.clone();
    let info = run(&state, "unit_info", move |explorer, cancel| {
        explorer.unit_info(&lookup, cancel)
    })
    .await?;
    info.map(Json)
        .ok_or_else(|| RpcError::UnitNotFound(unit.to_string()))
}

pub async fn rowid<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(unit): Path<String>,
) -> Result<Json<RowidResponse>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let unit = parse_unit(&unit)?;
    let lookup = unit.clone();
    let rowid = run(&state, "rowid", move |explorer, _| explorer.rowid_of(&lookup)).await?;
    rowid
        .map(|rowid| Json(RowidResponse { rowid }))
        .ok_or_else(|| RpcError::UnitNotFound(unit.to_string()))
}

pub async fn trigger<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(unit): Path<String>,
) -> Result<Json<TriggerResponse>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let unit = parse_unit(&unit)?;
    let trigger_unit = run(&state, "trigger", move |explorer, _| {
        explorer.trigger_unit(&unit)
    })
    .await?;
    Ok(Json(TriggerResponse { trigger_unit }))
}

pub async fn confirmation<L>(
    State(state): State<Arc<RpcState<L>>>,
    Path(unit): Path<String>,
) -> Result<Json<ConfirmationDelays>, RpcError>
where
    L: Ledger + Send + Sync + 'static,
{
    let unit = parse_unit(&unit)?;
    let delays = run(&state, "confirmation", move |explorer, cancel| {
        explorer.confirmation_delays(&unit, cancel)
    })
    .await?;
    state.metrics.observe_delays(&delays);
    Ok(Json(delays))
}
