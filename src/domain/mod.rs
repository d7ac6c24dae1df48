//! Domain module
//!
//! Money primitives and the wallet/transaction data model.

pub mod amount;
pub mod wallet;

pub use amount::{Amount, AmountError, Balance, MONEY_SCALE};
pub use wallet::{Transaction, TransactionKind, Wallet, Withdrawal};
