#![forbid(unsafe_code)]

use axum::http::header::InvalidHeaderValue;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use beacons_kernel_contracts::ContractViolation;
use beacons_os::PageRequestError;
use beacons_storage::StorageError;
use tracing::error;

/// Infrastructure failure while serving a request. Rendered as a bare 500.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    PageRequest(#[from] PageRequestError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
    #[error("invalid response header: {0}")]
    Header(#[from] InvalidHeaderValue),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}
