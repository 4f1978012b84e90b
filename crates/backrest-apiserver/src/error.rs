//! Error types for the API server and CLI

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use backrest_core::messages::Status;

/// Result type for API server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for API server operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request is missing required fields
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// A one-shot command finished with an error status
    #[error("{0}")]
    CommandFailed(String),

    /// Server configuration or startup failed
    #[error("configuration error: {0}")]
    Config(String),

    /// Kubernetes or backend failure
    #[error(transparent)]
    Backend(#[from] backrest_common::Error),

    /// Logging setup failed
    #[error(transparent)]
    Telemetry(#[from] backrest_common::telemetry::TelemetryError),

    /// Socket or stdout failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CRD rendering failed
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Create a bad request error
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Error::BadRequest(msg.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Backend(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Same envelope as a successful response so clients decode one shape
        let body = serde_json::json!({ "Status": Status::error(self.to_string()) });
        (status, Json(body)).into_response()
    }
}
