//! Command Handlers module
//!
//! The withdrawal service: handlers validate inputs and orchestrate calls
//! against an injected ledger store.

mod balance_handler;
mod commands;
mod withdraw_handler;


pub use balance_handler::BalanceHandler;
pub use commands::*;
pub use withdraw_handler::WithdrawHandler;
