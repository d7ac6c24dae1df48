//! Withdraw Handler
//!
//! Validates a withdrawal request and runs it through the ledger store's
//! atomic protocol.

use std::sync::Arc;

use crate::domain::Amount;
use crate::ledger::{ensure_valid_user_id, LedgerResult, LedgerStore};

use super::{WithdrawCommand, WithdrawResult};

/// Handler for wallet withdrawals
pub struct WithdrawHandler {
    store: Arc<dyn LedgerStore>,
}

impl WithdrawHandler {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Execute the withdraw command
    pub async fn execute(&self, command: WithdrawCommand) -> LedgerResult<WithdrawResult> {
        // Fail fast: nothing below this point runs for invalid input
        ensure_valid_user_id(command.user_id)?;
        let amount = Amount::new(command.amount)?;

        let withdrawal = self.store.withdraw(command.user_id, &amount).await?;

        Ok(WithdrawResult {
            user_id: withdrawal.wallet.user_id,
            amount: withdrawal.transaction.amount,
            balance_before: withdrawal.transaction.balance_before,
            balance_after: withdrawal.wallet.balance.value(),
            transaction_id: withdrawal.transaction.id,
        })
    }
}
