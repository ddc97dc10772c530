// src/error.rs
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::services::model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unreadable request body: {0}")]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Model(#[from] ModelError),
}

// Callers get a bare 500; the cause only goes to the log.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
