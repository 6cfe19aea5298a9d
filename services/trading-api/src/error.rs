//! HTTP-facing errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::execution::ExecutorError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unsupported symbol: {0}")]
    UnsupportedSymbol(String),

    /// Market data or position lookup failed; no decision was made
    #[error("Upstream data unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Trade refused: {0}")]
    TradeRefused(String),

    #[error("Trade execution failed: {0}")]
    ExecutionFailed(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedSymbol(_) => StatusCode::BAD_REQUEST,
            ApiError::TradeRefused(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UpstreamUnavailable(_) | ApiError::ExecutionFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::UnsupportedSymbol(_) => "unsupported_symbol",
            ApiError::UpstreamUnavailable(_) => "upstream_unavailable",
            ApiError::TradeRefused(_) => "trade_refused",
            ApiError::ExecutionFailed(_) => "execution_failed",
        }
    }
}

impl From<ExecutorError> for ApiError {
    fn from(e: ExecutorError) -> Self {
        if e.is_refusal() {
            ApiError::TradeRefused(e.to_string())
        } else {
            ApiError::ExecutionFailed(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (self.status(), body).into_response()
    }
}
