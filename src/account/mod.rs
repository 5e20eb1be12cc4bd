//! Account management module
//!
//! SQLite-backed storage for accounts and their wallets, plus payment
//! identifier generation.

pub mod models;
pub mod repository;
pub mod upi_id;
pub mod validation;

// Re-export commonly used types
pub use models::{Account, STARTING_BALANCE, Wallet};
pub use repository::{AccountRepository, WalletRepository};
pub use validation::{Email, NewAccount, ValidationError};

// Re-export Database from top-level db module
pub use crate::db::Database;
