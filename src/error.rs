//! Error handling module
//!
//! Boundary error type and its HTTP response conversion. This is the only
//! place ledger errors are turned into status codes and user-facing text.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::AmountError;
use crate::ledger::LedgerError;

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid user ID: {0}")]
    InvalidUserId(String),

    #[error("Request timed out")]
    RequestTimeout,

    // Ledger errors
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

fn invalid_amount_message(err: &AmountError) -> &'static str {
    match err {
        AmountError::NotPositive(_) | AmountError::Negative(_) => "Amount must be greater than 0",
        AmountError::TooManyDecimals(_) => "Amount must have at most 2 decimal places",
        AmountError::Overflow => "Amount exceeds maximum allowed value",
        AmountError::ParseError(_) => "Invalid amount format",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "Invalid request body".to_string(),
                Some(msg.clone()),
            ),
            AppError::InvalidUserId(raw) => (
                StatusCode::BAD_REQUEST,
                "invalid_user_id",
                "Invalid user ID".to_string(),
                Some(raw.clone()),
            ),

            // 408 Request Timeout
            AppError::RequestTimeout => (
                StatusCode::REQUEST_TIMEOUT,
                "request_timeout",
                "Request timed out".to_string(),
                None,
            ),

            AppError::Ledger(ledger_err) => match ledger_err {
                LedgerError::InvalidUserId(_) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_user_id",
                    "Invalid user ID".to_string(),
                    Some(ledger_err.to_string()),
                ),
                LedgerError::InvalidAmount(e) => (
                    StatusCode::BAD_REQUEST,
                    "invalid_amount",
                    invalid_amount_message(e).to_string(),
                    Some(e.to_string()),
                ),
                LedgerError::InsufficientFunds { .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_funds",
                    "Insufficient funds".to_string(),
                    Some(ledger_err.to_string()),
                ),

                // 404 Not Found
                LedgerError::WalletNotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "wallet_not_found",
                    "Wallet not found".to_string(),
                    None,
                ),

                // 500 Internal Server Error, retryable
                LedgerError::LockTimeout { user_id } => {
                    tracing::warn!(user_id = %user_id, "Wallet lock wait timed out");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "lock_timeout",
                        INTERNAL_SERVER_ERROR.to_string(),
                        None,
                    )
                }
                LedgerError::Database { stage, source } => {
                    tracing::error!(stage = %stage, "Database error: {:?}", source);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "database_error",
                        INTERNAL_SERVER_ERROR.to_string(),
                        None,
                    )
                }
            },

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    INTERNAL_SERVER_ERROR.to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
