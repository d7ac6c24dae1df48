//! Ledger Errors
//!
//! Closed error taxonomy for balance lookups and withdrawals.

use rust_decimal::Decimal;
use std::fmt;

use crate::domain::AmountError;

/// Ledger operation step at which storage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStage {
    /// Plain balance lookup, outside any unit of work
    Lookup,
    // Withdrawal unit of work
    Begin,
    Locking,
    Mutating,
    LoggingTransaction,
    Committing,
}

impl LedgerStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerStage::Lookup => "lookup",
            LedgerStage::Begin => "begin",
            LedgerStage::Locking => "locking",
            LedgerStage::Mutating => "mutating",
            LedgerStage::LoggingTransaction => "logging_transaction",
            LedgerStage::Committing => "committing",
        }
    }
}

impl fmt::Display for LedgerStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the ledger store and the withdrawal service
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid user ID: {0}")]
    InvalidUserId(i64),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Wallet not found for user {0}")]
    WalletNotFound(i64),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// Wallet row lock was not granted within the configured lock timeout
    #[error("Timed out waiting for wallet lock of user {user_id}")]
    LockTimeout { user_id: i64 },

    #[error("Database error while {stage}: {source}")]
    Database {
        stage: LedgerStage,
        #[source]
        source: sqlx::Error,
    },
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Attach the failing stage to a database error
    pub fn database(stage: LedgerStage) -> impl FnOnce(sqlx::Error) -> LedgerError {
        move |source| LedgerError::Database { stage, source }
    }

    /// Create an insufficient funds error
    pub fn insufficient_funds(required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds { required, available }
    }

    /// Persistence failures (lock timeout, database errors) may succeed on
    /// retry; validation and business errors reproduce for the same input.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::LockTimeout { .. } | LedgerError::Database { .. }
        )
    }
}
