//! Error types for DocRepo admin tooling
//!
//! The taxonomy is flat:
//! - Client-side validation failures, raised before any request is sent
//! - Server-side failures, carrying the server message or a status-derived one
//!
//! Every error is terminal for the operation that produced it. Nothing here
//! retries.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Shown when the server answers 403 without an explicit error
pub const MSG_FORBIDDEN: &str = "No tienes permisos para realizar esta acción";
/// Shown when the server answers 404 without an explicit error
pub const MSG_NOT_FOUND: &str = "Recurso no encontrado";
/// Shown for any 5xx without an explicit error
pub const MSG_SERVER_ERROR: &str = "Error interno del servidor";
/// Fallback for every other failure
pub const MSG_GENERIC: &str = "Error al procesar la solicitud";

/// Derive the user-facing message from an HTTP status alone.
pub fn message_for_status(status: StatusCode) -> &'static str {
    match status.as_u16() {
        403 => MSG_FORBIDDEN,
        404 => MSG_NOT_FOUND,
        s if s >= 500 => MSG_SERVER_ERROR,
        _ => MSG_GENERIC,
    }
}

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    PayloadTooLarge,
    InvalidStep,

    // Server-reported errors (4xxx)
    ApiError,
    Forbidden,
    NotFound,

    // Transport errors (8xxx)
    UpstreamError,
    InvalidResponse,

    // Internal errors (9xxx)
    ServerError,
    InternalError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::PayloadTooLarge => 1004,
            ErrorCode::InvalidStep => 1005,

            ErrorCode::ApiError => 4000,
            ErrorCode::Forbidden => 4003,
            ErrorCode::NotFound => 4004,

            ErrorCode::UpstreamError => 8001,
            ErrorCode::InvalidResponse => 8002,

            ErrorCode::ServerError => 9000,
            ErrorCode::InternalError => 9001,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client-side validation
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Payload too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Operation belongs to step {expected}, wizard is at step {actual}")]
    InvalidStep { expected: u8, actual: u8 },

    // Server-side
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
    },

    #[error("No tienes permisos para realizar esta acción")]
    Forbidden,

    #[error("Recurso no encontrado")]
    NotFound,

    #[error("Error interno del servidor ({status})")]
    Server { status: u16 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A 2xx answer the client cannot use: unparseable body or missing data
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse { endpoint: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Build the error for a non-2xx response.
    ///
    /// A server-provided message wins; otherwise the status decides.
    pub fn from_status(status: StatusCode, server_message: Option<String>) -> Self {
        if let Some(message) = server_message.filter(|m| !m.trim().is_empty()) {
            return AppError::Api {
                status: Some(status.as_u16()),
                message,
            };
        }
        match status.as_u16() {
            403 => AppError::Forbidden,
            404 => AppError::NotFound,
            s if s >= 500 => AppError::Server { status: s },
            s => AppError::Api {
                status: Some(s),
                message: MSG_GENERIC.to_string(),
            },
        }
    }

    /// Shorthand for a validation failure bound to a form field
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::InvalidStep { .. } => ErrorCode::InvalidStep,
            AppError::Api { .. } => ErrorCode::ApiError,
            AppError::Forbidden => ErrorCode::Forbidden,
            AppError::NotFound => ErrorCode::NotFound,
            AppError::Server { .. } => ErrorCode::ServerError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// True when the error was raised before any request left the client
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            AppError::Validation { .. }
                | AppError::PayloadTooLarge { .. }
                | AppError::InvalidStep { .. }
        )
    }

    /// Text for the blocking error dialog
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } | AppError::Api { message, .. } => message.clone(),
            AppError::Forbidden => MSG_FORBIDDEN.to_string(),
            AppError::NotFound => MSG_NOT_FOUND.to_string(),
            AppError::Server { .. } => MSG_SERVER_ERROR.to_string(),
            AppError::HttpClient(e) => match e.status() {
                Some(status) => message_for_status(status).to_string(),
                None => MSG_GENERIC.to_string(),
            },
            AppError::PayloadTooLarge { limit, .. } => format!(
                "El archivo supera el tamaño máximo permitido ({} MB)",
                limit / (1024 * 1024)
            ),
            AppError::InvalidResponse { .. }
            | AppError::Serialization(_)
            | AppError::Internal { .. } => MSG_GENERIC.to_string(),
            AppError::InvalidStep { .. } => self.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(message_for_status(StatusCode::FORBIDDEN), MSG_FORBIDDEN);
        assert_eq!(message_for_status(StatusCode::NOT_FOUND), MSG_NOT_FOUND);
        assert_eq!(message_for_status(StatusCode::INTERNAL_SERVER_ERROR), MSG_SERVER_ERROR);
        assert_eq!(message_for_status(StatusCode::BAD_GATEWAY), MSG_SERVER_ERROR);
        assert_eq!(message_for_status(StatusCode::BAD_REQUEST), MSG_GENERIC);
        assert_eq!(message_for_status(StatusCode::CONFLICT), MSG_GENERIC);
    }

    #[test]
    fn test_server_message_wins() {
        let err = AppError::from_status(StatusCode::FORBIDDEN, Some("Sesión expirada".into()));
        assert_eq!(err.user_message(), "Sesión expirada");
        assert_eq!(err.code(), ErrorCode::ApiError);

        let err = AppError::from_status(StatusCode::FORBIDDEN, Some("  ".into()));
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn test_status_fallbacks() {
        assert_eq!(
            AppError::from_status(StatusCode::NOT_FOUND, None).user_message(),
            MSG_NOT_FOUND
        );
        assert_eq!(
            AppError::from_status(StatusCode::SERVICE_UNAVAILABLE, None).code(),
            ErrorCode::ServerError
        );
        assert_eq!(
            AppError::from_status(StatusCode::UNPROCESSABLE_ENTITY, None).user_message(),
            MSG_GENERIC
        );
    }

    #[test]
    fn test_client_side_classification() {
        let err = AppError::validation("titulo", "El título es obligatorio");
        assert!(err.is_client_side());
        assert_eq!(err.user_message(), "El título es obligatorio");
        assert_eq!(err.code().as_code(), 1001);

        assert!(!AppError::NotFound.is_client_side());
        assert!(AppError::InvalidStep { expected: 2, actual: 1 }.is_client_side());
    }

    #[test]
    fn test_unusable_responses_show_generic_text() {
        let err = AppError::InvalidResponse {
            endpoint: "/api/proyectos/".into(),
            message: "response has no data".into(),
        };
        assert!(!err.is_client_side());
        assert_eq!(err.user_message(), MSG_GENERIC);
        assert_eq!(err.code().as_code(), 8002);

        let err: AppError = serde_json::from_str::<i64>("<html>login</html>").unwrap_err().into();
        assert!(!err.is_client_side());
        assert_eq!(err.user_message(), MSG_GENERIC);

        let err = AppError::Internal { message: "no document in wizard session".into() };
        assert_eq!(err.user_message(), MSG_GENERIC);
    }

    #[test]
    fn test_payload_too_large_message() {
        let err = AppError::PayloadTooLarge { size: 60 * 1024 * 1024, limit: 50 * 1024 * 1024 };
        assert!(err.is_client_side());
        assert_eq!(err.user_message(), "El archivo supera el tamaño máximo permitido (50 MB)");
    }
}
