//! MockUPI - peer-to-peer mock wallet
//!
//! Users register, receive a starting balance of ₹1000.00 and send money to
//! each other by UPI ID. Each UPI ID gets a scannable QR code.
//!
//! # Modules
//!
//! - [`money`] - Exact two-decimal amounts
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - tracing subscriber setup
//! - [`db`] - SQLite pool, schema and write gate
//! - [`account`] - Accounts, wallets and UPI ID generation
//! - [`qr`] - QR artifact rendering and storage
//! - [`transfer`] - Transfer workflow and ledger
//! - [`user_auth`] - Registration, login and sessions
//! - [`gateway`] - HTTP server (HTML pages and JSON API)

pub mod account;
pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod money;
pub mod qr;
pub mod transfer;
pub mod user_auth;

// Convenient re-exports at crate root
pub use account::{Account, Wallet};
pub use config::AppConfig;
pub use db::Database;
pub use money::Amount;
