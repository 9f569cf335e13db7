//! A centralized error type for the Axum web application.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::config::ConfigError;
use super::oauth::OAuthError;
use super::uid::UidError;

const INTERNAL_MSG: &str = "An internal server error occurred";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    /// A third-party service answered with a non-success status. The status
    /// and body are relayed to the caller unchanged.
    #[error("Upstream service responded with {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Session operation failed: {0}")]
    Session(String),

    // Internal Libraries
    #[error("Config operation failed")]
    Config(#[from] ConfigError),

    #[error("OAuth operation failed")]
    OAuth(#[from] OAuthError),

    #[error("Document ID generation failed")]
    IdGeneration(#[from] UidError),

    // Third Party Libraries
    #[error("HTTP client operation failed")]
    Http(#[from] reqwest::Error),

    #[error("Serde JSON operation failed")]
    JsonParse(#[from] serde_json::Error),

    #[error("An internal server error occurred")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation(err) => {
                let details = json!(err.field_errors());
                (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), Some(details))
            },
            AppError::RequestFormat(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Upstream { status, body } => {
                tracing::warn!(status = %status, "Relaying upstream error response");
                return (status, body).into_response();
            },
            AppError::Session(msg) => {
                tracing::error!("Session error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },

            // Internal Libraries
            AppError::Config(err) => {
                tracing::error!("Config getter error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::OAuth(err) => {
                tracing::warn!("OAuth error: {:?}", err);
                let status = match err {
                    OAuthError::HttpClient(_) | OAuthError::ProfileParse | OAuthError::UserInfo(_) => {
                        StatusCode::BAD_GATEWAY
                    },
                    OAuthError::InvalidUrl(_)
                    | OAuthError::Provider { .. }
                    | OAuthError::MissingCode
                    | OAuthError::StateMismatch => StatusCode::BAD_REQUEST,
                };
                let message = match status {
                    StatusCode::BAD_GATEWAY => "OAuth provider unavailable".to_string(),
                    _ => "OAuth operation failed".to_string(),
                };
                (status, message, Some(json!({ "error": err.code() })))
            },
            AppError::IdGeneration(err) => {
                tracing::error!("ID generation error: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },

            // Third Party Libraries
            AppError::Http(err) => {
                tracing::error!("Outbound HTTP error: {:?}", err);
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string(), None)
            },
            AppError::JsonParse(err) => {
                tracing::error!("Failed to parse JSON: {:?}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None)
            },
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG.to_string(), None),
        };

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}
