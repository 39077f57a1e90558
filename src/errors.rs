//! Caller-facing error taxonomy (spec §7). Internal failures that never
//! reach a client are wrapped as `Internal` and logged, not surfaced.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dusa_collection_utils::core::errors::ErrorArrayItem;
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum SupervisorError {
    InvalidRequest(String),
    NodeAlreadyExists(String),
    NodeNotFound(String),
    LaunchFailed(String),
    Internal(ErrorArrayItem),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisorError::InvalidRequest(m) => write!(f, "invalid request: {m}"),
            SupervisorError::NodeAlreadyExists(n) => write!(f, "node already exists: {n}"),
            SupervisorError::NodeNotFound(n) => write!(f, "node not found: {n}"),
            SupervisorError::LaunchFailed(m) => write!(f, "launch failed: {m}"),
            SupervisorError::Internal(e) => write!(f, "internal error: {}", e.err_mesg),
        }
    }
}

impl std::error::Error for SupervisorError {}

impl From<ErrorArrayItem> for SupervisorError {
    fn from(value: ErrorArrayItem) -> Self {
        SupervisorError::Internal(value)
    }
}

impl From<std::io::Error> for SupervisorError {
    fn from(value: std::io::Error) -> Self {
        SupervisorError::LaunchFailed(value.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for SupervisorError {
    fn into_response(self) -> Response {
        let status = match &self {
            SupervisorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            SupervisorError::NodeAlreadyExists(_) => StatusCode::BAD_REQUEST,
            SupervisorError::NodeNotFound(_) => StatusCode::NOT_FOUND,
            SupervisorError::LaunchFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SupervisorError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}
