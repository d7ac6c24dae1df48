//! Balance Handler
//!
//! Read-only balance inquiry.

use std::sync::Arc;

use crate::ledger::{LedgerResult, LedgerStore};

use super::BalanceResult;

/// Handler for balance lookups
pub struct BalanceHandler {
    store: Arc<dyn LedgerStore>,
}

impl BalanceHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Current balance of the user's wallet. Does not take the wallet lock.
    pub async fn execute(&self, user_id: i64) -> LedgerResult<BalanceResult> {
        let wallet = self.store.find_wallet_by_user(user_id).await?;

        Ok(BalanceResult {
            user_id: wallet.user_id,
            balance: wallet.balance.value(),
        })
    }
}
