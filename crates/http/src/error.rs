//! The error surface: every failed request ends here and leaves as a JSON
//! envelope carrying a trace id that also appears in the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

const HIDDEN_INTERNAL_MESSAGE: &str = "An internal server error occurred";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

/// `{"error": {...}}` on the wire.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest { message: String, code: String },

    /// Anything the caller cannot fix; details stay in the logs outside
    /// debug builds.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the failure under `trace_id` and produce the client-facing code
    /// and message.
    fn into_code_and_message(self, trace_id: &Uuid) -> (String, String) {
        match self {
            AppError::NotFound { message, code } | AppError::BadRequest { message, code } => {
                tracing::warn!(trace_id = %trace_id, code = %code, %message, "request rejected");
                (code, message)
            }
            AppError::Internal(err) => {
                tracing::error!(trace_id = %trace_id, error = ?err, "request failed");
                let message = if cfg!(debug_assertions) {
                    format!("{err:#}")
                } else {
                    HIDDEN_INTERNAL_MESSAGE.to_string()
                };
                ("internal_error".to_string(), message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let trace_id = Uuid::new_v4();
        let (code, message) = self.into_code_and_message(&trace_id);

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                details: Vec::new(),
                trace_id: trace_id.to_string(),
                timestamp: OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
            },
        };

        (status, Json(envelope)).into_response()
    }
}
