//! RPC error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use dagview_explorer::ExplorerError;
use dagview_store::StoreError;
use dagview_types::TypesError;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("unit not found: {0}")]
    UnitNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("request cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::UnitNotFound(_) => StatusCode::NOT_FOUND,
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::StoreUnavailable(_) | RpcError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            RpcError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            RpcError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RpcError::UnitNotFound(_) => "UNIT_NOT_FOUND",
            RpcError::InvalidRequest(_) => "INVALID_REQUEST",
            RpcError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            RpcError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            RpcError::Cancelled => "CANCELLED",
            RpcError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for RpcError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(_) => RpcError::StoreUnavailable(e.to_string()),
            other => RpcError::Internal(other.to_string()),
        }
    }
}

impl From<ExplorerError> for RpcError {
    fn from(e: ExplorerError) -> Self {
        match e {
            ExplorerError::Store(store) => store.into(),
            ExplorerError::UnitNotFound(unit) => RpcError::UnitNotFound(unit.to_string()),
            ExplorerError::DeadlineExceeded => RpcError::DeadlineExceeded,
            ExplorerError::Cancelled => RpcError::Cancelled,
            other @ ExplorerError::InconsistentWitnessSet { .. } => {
                RpcError::Internal(other.to_string())
            }
        }
    }
}

impl From<TypesError> for RpcError {
    fn from(e: TypesError) -> Self {
        RpcError::InvalidRequest(e.to_string())
    }
}

impl From<tokio::task::JoinError> for RpcError {
    fn from(e: tokio::task::JoinError) -> Self {
        RpcError::Internal(format!("blocking task failed: {e}"))
    }
}
