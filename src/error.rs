/// Unified error types for the contactry backend
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Wrong email/password pair; deliberately says nothing about which
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No live account for the given identifier
    #[error("Your account was not found")]
    AccountNotFound,

    /// Account status is Locked; only an administrator can unlock
    #[error("Your account has been locked, please contact an administrator")]
    AccountLocked,

    /// Login or reset attempted before the confirmation link was used
    #[error("Please confirm your email address")]
    EmailNotConfirmed,

    /// Confirmation link used twice
    #[error("Your email was confirmed before. Please login to your account")]
    AlreadyConfirmed,

    /// Refresh-path rejection; the caller has to authenticate again
    #[error("Invalid or expired token, please try to login")]
    TokenInvalidOrExpired,

    /// Emailed confirm/reset token rejected; a request problem, not an
    /// authentication failure
    #[error("Invalid or expired token, please try again")]
    PurposeTokenInvalid,

    /// Forgot/reset requested for an address that was never confirmed
    #[error("Please confirm your email address")]
    ConfirmationRequired,

    /// Token text was not valid URL-safe base64 / UTF-8
    #[error("Malformed token")]
    MalformedToken,

    /// Outbound mail dispatch failed; no retry is attempted
    #[error("Failed to send email: {0}")]
    EmailDelivery(String),

    /// Request field constraints violated
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller lacks a valid bearer token or required role
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "InvalidCredentials", self.to_string())
            }
            ApiError::AccountNotFound => {
                (StatusCode::UNAUTHORIZED, "AccountNotFound", self.to_string())
            }
            ApiError::AccountLocked => {
                (StatusCode::UNAUTHORIZED, "AccountLocked", self.to_string())
            }
            ApiError::EmailNotConfirmed => {
                (StatusCode::UNAUTHORIZED, "EmailNotConfirmed", self.to_string())
            }
            ApiError::TokenInvalidOrExpired => {
                (StatusCode::UNAUTHORIZED, "TokenInvalidOrExpired", self.to_string())
            }
            ApiError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized", self.to_string())
            }
            ApiError::AlreadyConfirmed => {
                (StatusCode::BAD_REQUEST, "AlreadyConfirmed", self.to_string())
            }
            ApiError::PurposeTokenInvalid => {
                (StatusCode::BAD_REQUEST, "PurposeTokenInvalid", self.to_string())
            }
            ApiError::ConfirmationRequired => {
                (StatusCode::BAD_REQUEST, "ConfirmationRequired", self.to_string())
            }
            ApiError::MalformedToken => {
                (StatusCode::BAD_REQUEST, "MalformedToken", self.to_string())
            }
            ApiError::EmailDelivery(_) => {
                (StatusCode::BAD_REQUEST, "EmailDeliveryFailure", self.to_string())
            }
            ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            ApiError::Database(_) | ApiError::Io(_) | ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
