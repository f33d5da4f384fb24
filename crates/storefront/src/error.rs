//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use techmart_ledger::ShopError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A ledger operation failed.
    #[error(transparent)]
    Shop(#[from] ShopError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No user is logged in.
    #[error("Login required")]
    Unauthorized,

    /// The user may not access this resource.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Shop(err) => match err {
                ShopError::NotFound { .. } => StatusCode::NOT_FOUND,
                ShopError::InsufficientStock { .. }
                | ShopError::EmptyCart
                | ShopError::InvalidTransition { .. }
                | ShopError::AlreadyExists { .. } => StatusCode::CONFLICT,
                ShopError::Invalid(_) | ShopError::InvalidEmail(_) | ShopError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                ShopError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                ShopError::Forbidden(_) => StatusCode::FORBIDDEN,
                ShopError::PasswordHash | ShopError::LockPoisoned(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code sent alongside the message.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Shop(err) => match err {
                ShopError::NotFound { .. } => "not_found",
                ShopError::InsufficientStock { .. } => "insufficient_stock",
                ShopError::EmptyCart => "empty_cart",
                ShopError::InvalidTransition { .. } => "invalid_transition",
                ShopError::AlreadyExists { .. } => "already_exists",
                ShopError::Forbidden(_) => "forbidden",
                ShopError::Invalid(_) | ShopError::InvalidEmail(_) | ShopError::WeakPassword(_) => {
                    "invalid"
                }
                ShopError::InvalidCredentials => "invalid_credentials",
                ShopError::PasswordHash | ShopError::LockPoisoned(_) => "internal",
            },
            Self::BadRequest(_) => "invalid",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Session(_) | Self::Internal(_) => "internal",
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Shop(err) => err.is_internal(),
            Self::Session(_) | Self::Internal(_) => true,
            Self::BadRequest(_) | Self::Unauthorized | Self::Forbidden(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = json!({
            "error": self.code(),
            "message": message,
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(email.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
