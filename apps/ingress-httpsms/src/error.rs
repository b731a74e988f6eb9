use axum::response::{IntoResponse, Response};
use axum::{Json, http::StatusCode};
use serde_json::json;
use smshook_core::{DecodeError, EnvelopeError};
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum IngressError {
    #[error("invalid envelope: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("internal server error")]
    Internal(#[source] tokio::task::JoinError),
}

impl IngressError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngressError::Envelope(_) | IngressError::Decode(_) => StatusCode::BAD_REQUEST,
            IngressError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        match &self {
            IngressError::Envelope(err) => warn!("rejecting webhook body: {err}"),
            IngressError::Decode(_) => {}
            IngressError::Internal(err) => error!("ingestion task failed: {err}"),
        }
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
