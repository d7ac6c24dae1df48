//! Ledger Store module
//!
//! Owns persisted wallet state and the atomic withdrawal primitive.
//! Backed by PostgreSQL in production; an in-process store with the same
//! row-lock contract is available for tests and tooling.

mod error;
mod memory;
mod repository;

pub use error::{LedgerError, LedgerResult, LedgerStage};
pub use memory::MemoryLedgerStore;
pub use repository::{ensure_valid_user_id, LedgerStore, PgLedgerStore};
