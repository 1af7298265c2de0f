use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use thiserror::Error;
use tracing::error;

use crate::relay::RelayError;

/// Errors surfaced by the HTTP API, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    /// Missing external credential; the message names what to set.
    #[error("{0}")]
    Configuration(String),

    /// Upstream answered with a failure; details stay in the logs.
    #[error("Failed to get AI response")]
    UpstreamFailure,

    #[error("An unexpected error occurred")]
    Unexpected,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::InvalidRequest(_) => Status::BadRequest,
            ApiError::Configuration(_) | ApiError::UpstreamFailure | ApiError::Unexpected => {
                Status::InternalServerError
            }
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::NotConfigured { .. } => ApiError::Configuration(e.to_string()),
            RelayError::Upstream { .. } => ApiError::UpstreamFailure,
            RelayError::Timeout(_) | RelayError::Transport(_) => {
                error!(error = %e, "chat relay: request to upstream failed");
                ApiError::Unexpected
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).respond_to(req)
    }
}
