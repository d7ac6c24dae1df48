//! Ledger Store Repository
//!
//! Capability trait over wallet storage and its PostgreSQL implementation.
//! Withdrawals run as a single database transaction holding a row lock
//! (`SELECT ... FOR UPDATE`) on the wallet for the whole unit of work.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction as DbTransaction};
use std::time::Duration;

use crate::domain::{Amount, Balance, Transaction, TransactionKind, Wallet, Withdrawal};

use super::{LedgerError, LedgerResult, LedgerStage};

/// SQLSTATE raised when `lock_timeout` expires (lock_not_available)
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Storage operations the withdrawal service depends on
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Plain, non-locking read of a user's wallet
    async fn find_wallet_by_user(&self, user_id: i64) -> LedgerResult<Wallet>;

    /// Atomically debit `amount` from the user's wallet and record the
    /// transaction. Either both writes commit or neither is visible.
    async fn withdraw(&self, user_id: i64, amount: &Amount) -> LedgerResult<Withdrawal>;
}

/// User IDs are positive; anything else is rejected before storage is touched
pub fn ensure_valid_user_id(user_id: i64) -> LedgerResult<()> {
    if user_id <= 0 {
        return Err(LedgerError::InvalidUserId(user_id));
    }
    Ok(())
}

type WalletRow = (i64, i64, Decimal, DateTime<Utc>, DateTime<Utc>);

fn wallet_from_row(row: WalletRow) -> Result<Wallet, sqlx::Error> {
    let (id, user_id, balance, created_at, updated_at) = row;
    let balance = Balance::new(balance).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Wallet {
        id,
        user_id,
        balance,
        created_at,
        updated_at,
    })
}

fn is_lock_timeout(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(LOCK_NOT_AVAILABLE),
        _ => false,
    }
}

/// PostgreSQL-backed ledger store
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgLedgerStore {
    /// Create a new store. `lock_timeout` bounds how long a withdrawal waits
    /// for another withdrawal on the same wallet.
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Lock, check, update and log inside `tx`; the caller owns commit and rollback.
    async fn withdraw_in(
        &self,
        tx: &mut DbTransaction<'_, Postgres>,
        user_id: i64,
        amount: &Amount,
    ) -> LedgerResult<Withdrawal> {
        // Scoped to this transaction only
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(format!("{}ms", self.lock_timeout.as_millis()))
            .execute(&mut **tx)
            .await
            .map_err(LedgerError::database(LedgerStage::Begin))?;

        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, balance, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            if is_lock_timeout(&e) {
                LedgerError::LockTimeout { user_id }
            } else {
                LedgerError::database(LedgerStage::Locking)(e)
            }
        })?;

        let row = row.ok_or(LedgerError::WalletNotFound(user_id))?;
        let wallet = wallet_from_row(row).map_err(LedgerError::database(LedgerStage::Locking))?;

        let balance_before = wallet.balance;
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

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = $1, updated_at = $2
            WHERE id = $3
            "#,
        )
        .bind(balance_after.value())
        .bind(now)
        .bind(wallet.id)
        .execute(&mut **tx)
        .await
        .map_err(LedgerError::database(LedgerStage::Mutating))?;

        let kind = TransactionKind::Withdraw;
        let transaction_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO transactions (wallet_id, amount, type, balance_before, balance_after, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(wallet.id)
        .bind(amount.value())
        .bind(kind.as_str())
        .bind(balance_before.value())
        .bind(balance_after.value())
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .map_err(LedgerError::database(LedgerStage::LoggingTransaction))?;

        let transaction = Transaction {
            id: transaction_id,
            wallet_id: wallet.id,
            amount: amount.value(),
            kind,
            balance_before: balance_before.value(),
            balance_after: balance_after.value(),
            created_at: now,
        };

        let wallet = Wallet {
            balance: balance_after,
            updated_at: now,
            ..wallet
        };

        Ok(Withdrawal {
            wallet,
            transaction,
        })
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn find_wallet_by_user(&self, user_id: i64) -> LedgerResult<Wallet> {
        ensure_valid_user_id(user_id)?;

        let row: Option<WalletRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, balance, created_at, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::database(LedgerStage::Lookup))?;

        let row = row.ok_or(LedgerError::WalletNotFound(user_id))?;
        wallet_from_row(row).map_err(LedgerError::database(LedgerStage::Lookup))
    }

    async fn withdraw(&self, user_id: i64, amount: &Amount) -> LedgerResult<Withdrawal> {
        ensure_valid_user_id(user_id)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(LedgerError::database(LedgerStage::Begin))?;

        match self.withdraw_in(&mut tx, user_id, amount).await {
            Ok(withdrawal) => {
                tx.commit()
                    .await
                    .map_err(LedgerError::database(LedgerStage::Committing))?;
                Ok(withdrawal)
            }
            Err(err) => {
                // A failed rollback still leaves the transaction uncommitted
                let _ = tx.rollback().await;
                Err(err)
            }
        }
    }
}
