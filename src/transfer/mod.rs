//! Peer-to-peer transfers
//!
//! Moves funds between two wallets by payment identifier and records the
//! move in the ledger.
//!
//! # Safety Invariants
//!
//! 1. **All-or-nothing**: debit, credit and ledger append commit together
//! 2. **No overdraft**: the sender balance is re-read inside the transaction
//!    and the debit is guarded by `balance >= amount`
//! 3. **Single writer**: the transaction runs under the database write gate
//! 4. **Conservation**: the sum of all balances never changes

pub mod error;
pub mod ledger;
pub mod service;

// Re-exports for convenience
pub use error::{ErrorKind, TransferError};
pub use ledger::{Direction, LedgerEntry, LedgerRepository};
pub use service::{
    DEFAULT_DESCRIPTION, TransferReceipt, TransferRequest, TransferService, ValidatedTransfer,
};
