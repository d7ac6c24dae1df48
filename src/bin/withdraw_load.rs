//! Concurrent withdrawal check
//!
//! Seeds one wallet, fires many withdrawals at it concurrently and verifies
//! that the final balance accounts for every committed withdrawal.
//!
//! Run with: cargo run --bin withdraw_load --release -- --withdrawals 200 --amount 1.25

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use wallet_api::{Amount, Config, LedgerError, LedgerStore, PgLedgerStore};

fn arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let user_id: i64 = arg(&args, "--user-id", 900_001);
    let withdrawals: usize = arg(&args, "--withdrawals", 200);
    let amount: Amount = arg(&args, "--amount", "1.25".to_string()).parse()?;
    let initial: Decimal = arg(&args, "--initial", Decimal::new(10_000, 2));

    let config = Config::from_env()?;

    println!(
        "Withdraw Load - {} x {} against wallet of user {} (initial {})",
        withdrawals, amount, user_id, initial
    );
    println!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect_with(config.database.clone())
        .await?;

    // Reset the test wallet out-of-band
    let wallet_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO wallets (user_id, balance)
        VALUES ($1, $2)
        ON CONFLICT (user_id) DO UPDATE SET balance = EXCLUDED.balance, updated_at = NOW()
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(initial)
    .fetch_one(&pool)
    .await?;

    sqlx::query("DELETE FROM transactions WHERE wallet_id = $1")
        .bind(wallet_id)
        .execute(&pool)
        .await?;

    let store = Arc::new(PgLedgerStore::new(pool.clone(), config.lock_timeout));
    let start = Instant::now();

    let handles: Vec<_> = (0..withdrawals)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.withdraw(user_id, &amount).await })
        })
        .collect();

    let mut succeeded = 0u64;
    let mut insufficient = 0u64;
    let mut failed = 0u64;
    for handle in handles {
        match handle.await? {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientFunds { .. }) => insufficient += 1,
            Err(e) => {
                failed += 1;
                eprintln!("Withdrawal error: {}", e);
            }
        }
    }

    let elapsed = start.elapsed();

    let final_balance: Decimal = sqlx::query_scalar("SELECT balance FROM wallets WHERE id = $1")
        .bind(wallet_id)
        .fetch_one(&pool)
        .await?;
    let recorded: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE wallet_id = $1")
        .bind(wallet_id)
        .fetch_one(&pool)
        .await?;

    let expected = initial - amount.value() * Decimal::from(succeeded);
    let consistent = final_balance == expected && recorded as u64 == succeeded;

    println!("\n=== Withdraw Load Results ===");
    println!("Attempts: {}", withdrawals);
    println!("Committed: {}", succeeded);
    println!("Insufficient funds: {}", insufficient);
    println!("Other errors: {}", failed);
    println!("Transactions recorded: {}", recorded);
    println!("Final balance: {} (expected {})", final_balance, expected);
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Consistent: {}", if consistent { "yes" } else { "NO - lost update" });

    pool.close().await;

    if !consistent {
        return Err(anyhow::anyhow!("Ledger inconsistent after concurrent withdrawals"));
    }
    Ok(())
}
