//! wallet_api Library
//!
//! Re-exports modules for the server binary, tooling and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod ledger;

mod error;

pub use config::{Config, LogFormat};
pub use domain::{Amount, AmountError, Balance, Transaction, TransactionKind, Wallet, Withdrawal};
pub use error::AppError;
pub use ledger::{LedgerError, LedgerStore, MemoryLedgerStore, PgLedgerStore};
