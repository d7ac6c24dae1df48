//! In-process Ledger Store
//!
//! Same locking contract as the PostgreSQL store, with one async mutex per
//! wallet standing in for the row lock. Each wallet slot also owns its
//! transaction log, so the balance write and the log append happen under one
//! lock with no suspension point in between.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Amount, Balance, Transaction, TransactionKind, Wallet, Withdrawal};

use super::repository::ensure_valid_user_id;
use super::{LedgerError, LedgerResult, LedgerStore};

#[derive(Debug)]
struct WalletSlot {
    wallet: Wallet,
    transactions: Vec<Transaction>,
}

/// Ledger store kept entirely in memory
#[derive(Debug)]
pub struct MemoryLedgerStore {
    wallets: RwLock<HashMap<i64, Arc<Mutex<WalletSlot>>>>,
    next_wallet_id: AtomicI64,
    next_transaction_id: AtomicI64,
    lock_timeout: Duration,
}

impl MemoryLedgerStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            wallets: RwLock::new(HashMap::new()),
            next_wallet_id: AtomicI64::new(1),
            next_transaction_id: AtomicI64::new(1),
            lock_timeout,
        }
    }

    /// Seed a wallet for `user_id`. If the user already has one, it is
    /// returned unchanged.
    pub async fn insert_wallet(&self, user_id: i64, balance: Balance) -> LedgerResult<Wallet> {
        ensure_valid_user_id(user_id)?;

        let slot = {
            let mut wallets = self.wallets.write().await;
            wallets
                .entry(user_id)
                .or_insert_with(|| {
                    let now = Utc::now();
                    Arc::new(Mutex::new(WalletSlot {
                        wallet: Wallet {
                            id: self.next_wallet_id.fetch_add(1, Ordering::SeqCst),
                            user_id,
                            balance,
                            created_at: now,
                            updated_at: now,
                        },
                        transactions: Vec::new(),
                    }))
                })
                .clone()
        };

        let slot = slot.lock().await;
        Ok(slot.wallet.clone())
    }

    /// Transactions recorded against the user's wallet, oldest first
    pub async fn transactions_for(&self, user_id: i64) -> Vec<Transaction> {
        match self.slot(user_id).await {
            Some(slot) => slot.lock().await.transactions.clone(),
            None => Vec::new(),
        }
    }

    async fn slot(&self, user_id: i64) -> Option<Arc<Mutex<WalletSlot>>> {
        self.wallets.read().await.get(&user_id).cloned()
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn find_wallet_by_user(&self, user_id: i64) -> LedgerResult<Wallet> {
        ensure_valid_user_id(user_id)?;

        let slot = self
            .slot(user_id)
            .await
            .ok_or(LedgerError::WalletNotFound(user_id))?;

        let slot = slot.lock().await;
        Ok(slot.wallet.clone())
    }

    async fn withdraw(&self, user_id: i64, amount: &Amount) -> LedgerResult<Withdrawal> {
        ensure_valid_user_id(user_id)?;

        let slot = self
            .slot(user_id)
            .await
            .ok_or(LedgerError::WalletNotFound(user_id))?;

        let mut slot = tokio::time::timeout(self.lock_timeout, slot.lock_owned())
            .await
            .map_err(|_| LedgerError::LockTimeout { user_id })?;

        // No await below this point: the update is all-or-nothing.
        let balance_before = slot.wallet.balance;
        if !balance_before.is_sufficient_for(amount) {
            return Err(LedgerError::insufficient_funds(
                amount.value(),
                balance_before.value(),
            ));
        }
        let balance_after = balance_before.debit(amount).map_err(|_| {
            LedgerError::insufficient_funds(amount.value(), balance_before.value())
        })?;

        let now = Utc::now();
        let transaction = Transaction {
            id: self.next_transaction_id.fetch_add(1, Ordering::SeqCst),
            wallet_id: slot.wallet.id,
            amount: amount.value(),
            kind: TransactionKind::Withdraw,
            balance_before: balance_before.value(),
            balance_after: balance_after.value(),
            created_at: now,
        };

        slot.wallet.balance = balance_after;
        slot.wallet.updated_at = now;
        slot.transactions.push(transaction.clone());

        Ok(Withdrawal {
            wallet: slot.wallet.clone(),
            transaction,
        })
    }
}
