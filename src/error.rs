//! Error types for ShasthoBondhu.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Top-level error type for service operations.
///
/// Every variant maps onto one HTTP status; see [`ServiceError::status_code`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("AI service failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl ServiceError {
    /// Build a validation error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// HTTP-equivalent status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream(_) | Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short user-facing message. Diagnostic detail goes in `details`.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound { entity, .. } => format!("{entity} not found."),
            Self::Upstream(_) => "AI service failed.".to_string(),
            Self::Persistence(_) => "Storage failed.".to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = serde_json::json!({
            "ok": false,
            "error": self.public_message(),
        });
        match &self {
            Self::Upstream(e) => body["details"] = serde_json::json!(e.to_string()),
            Self::Persistence(e) => body["details"] = serde_json::json!(e.to_string()),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Record store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {collection}: {source}")]
    Io {
        collection: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error on {collection}: {source}")]
    Serialization {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record not found in {collection}: {id}")]
    NotFound { collection: String, id: String },
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Missing API key for provider {provider}")]
    MissingApiKey { provider: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// SMS transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to send message on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Result type alias for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
