//! Common test utilities

#![allow(dead_code)]

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

use wallet_api::{Balance, MemoryLedgerStore};

const SCHEMA: &str = include_str!("../../migrations/0001_create_wallets.sql");

static SCHEMA_APPLIED: OnceCell<()> = OnceCell::const_new();

/// Setup test database - apply the schema and return a pool
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    // Multi-statement script goes over the simple query protocol
    SCHEMA_APPLIED
        .get_or_init(|| async {
            pool.execute(SCHEMA).await.expect("Failed to apply schema");
        })
        .await;

    pool
}

/// User IDs unique per test run so tests can share one database
pub fn unique_user_id() -> i64 {
    static BASE: OnceLock<i64> = OnceLock::new();
    static NEXT: AtomicI64 = AtomicI64::new(1);

    let base = *BASE.get_or_init(|| chrono::Utc::now().timestamp_millis() * 1_000);
    base + NEXT.fetch_add(1, Ordering::SeqCst)
}

/// Insert a wallet out-of-band and return its id
pub async fn seed_wallet(pool: &PgPool, user_id: i64, balance: Decimal) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO wallets (user_id, balance)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(balance)
    .fetch_one(pool)
    .await
    .expect("Failed to seed wallet")
}

/// Number of transactions recorded for a wallet
pub async fn transaction_count(pool: &PgPool, wallet_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE wallet_id = $1")
        .bind(wallet_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count transactions")
}

/// In-process store seeded with (user_id, balance) pairs
pub async fn memory_store(wallets: &[(i64, Decimal)]) -> Arc<MemoryLedgerStore> {
    let store = Arc::new(MemoryLedgerStore::default());
    for (user_id, balance) in wallets {
        store
            .insert_wallet(*user_id, Balance::new(*balance).unwrap())
            .await
            .unwrap();
    }
    store
}
