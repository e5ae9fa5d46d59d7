//! Error types for Dashgate
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` so no failure ever escapes a handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::views::Page;

/// Application-wide error type
///
/// User-facing variants render plain text the visitor can act on.
/// Lower-layer faults render a generic message and are logged for operators.
#[derive(Debug, Error)]
pub enum AppError {
    /// Registration with a username that is already taken
    #[error("User already exists")]
    DuplicateUser,

    /// Login with an unknown username
    #[error("User not found")]
    UserNotFound,

    /// Login with a wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No valid session on a protected route (always redirected)
    #[error("Authentication required")]
    Unauthorized,

    /// Malformed form input (400)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Credential store error other than SQL (500)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Credential store did not answer within the configured timeout (500)
    #[error("Storage call timed out")]
    StorageTimeout,

    /// Password hashing failed (500)
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<axum::extract::rejection::FormRejection> for AppError {
    fn from(err: axum::extract::rejection::FormRejection) -> Self {
        tracing::debug!(error = %err, "Malformed form submission");
        AppError::Validation("username and password are required".to_string())
    }
}

impl From<tokio::time::error::Elapsed> for AppError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        AppError::StorageTimeout
    }
}

impl AppError {
    /// Label used for the `dashgate_errors_total` metric
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DuplicateUser => "duplicate_user",
            AppError::UserNotFound => "user_not_found",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthorized => "unauthorized",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "database",
            AppError::Storage(_) => "storage",
            AppError::StorageTimeout => "storage_timeout",
            AppError::Hashing(_) => "hashing",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }

    /// Whether this error is a lower-layer fault hidden from the visitor
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Storage(_)
                | AppError::StorageTimeout
                | AppError::Hashing(_)
                | AppError::Config(_)
                | AppError::Internal(_)
        )
    }

    /// Map the error to a presentation instruction
    pub fn to_page(&self) -> Page {
        match self {
            AppError::DuplicateUser => Page::Message {
                text: "User already exists.".to_string(),
                link: Some(("/register", "Try again")),
            },
            AppError::UserNotFound => Page::Message {
                text: "User not found".to_string(),
                link: None,
            },
            AppError::InvalidCredentials => Page::Message {
                text: "Invalid credentials".to_string(),
                link: None,
            },
            AppError::Unauthorized => Page::Redirect("/login"),
            AppError::Validation(msg) => Page::Error {
                status: StatusCode::BAD_REQUEST,
                message: msg.clone(),
            },
            _ => Page::Error {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Server error".to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            tracing::error!(error = %self, error_type = self.error_type(), "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        self.to_page().into_response()
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
