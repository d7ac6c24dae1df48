//! Command definitions
//!
//! Validated-primitive inputs coming from the HTTP boundary, and the results
//! handed back to it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Command to withdraw funds from a user's wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub user_id: i64,
    /// Requested amount, validated by the handler before any storage access
    pub amount: Decimal,
}

impl WithdrawCommand {
    pub fn new(user_id: i64, amount: Decimal) -> Self {
        Self { user_id, amount }
    }
}

/// Result of a successful withdrawal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawResult {
    pub user_id: i64,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub transaction_id: i64,
}

/// Result of a balance inquiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResult {
    pub user_id: i64,
    pub balance: Decimal,
}
