//! Transfer Error Types
//!
//! Every way a transfer can end without moving money. `kind()` separates
//! user-input problems from store inconsistencies and storage failures so
//! each category gets its own message and status.

use thiserror::Error;

use crate::money::MoneyError;

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input; nothing was touched
    Validation,
    /// The store contradicts its own invariants (e.g. account without wallet)
    Integrity,
    /// The unit of work could not be committed; everything was rolled back
    Storage,
}

#[derive(Error, Debug)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Recipient UPI ID and Amount are required.")]
    MissingFields,

    #[error("Invalid amount. Please enter a numerical value.")]
    InvalidNumber,

    #[error("Amount must be positive.")]
    NonPositiveAmount,

    #[error("Amount cannot have more than 2 decimal places.")]
    PrecisionOverflow,

    #[error("Amount is too large.")]
    AmountTooLarge,

    #[error("You cannot send money to yourself.")]
    SelfTransfer,

    #[error("Recipient UPI ID \"{0}\" not found.")]
    RecipientNotFound(String),

    #[error("Insufficient balance to complete the transaction.")]
    InsufficientBalance,

    // === Integrity Errors ===
    #[error("Recipient wallet not found. Please contact support.")]
    RecipientWalletMissing,

    #[error("Wallet not found for your account. Please contact support.")]
    SenderWalletMissing,

    // === Storage Errors ===
    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<MoneyError> for TransferError {
    fn from(e: MoneyError) -> Self {
        match e {
            MoneyError::InvalidFormat(_) => TransferError::InvalidNumber,
            MoneyError::NotPositive => TransferError::NonPositiveAmount,
            MoneyError::PrecisionOverflow { .. } => TransferError::PrecisionOverflow,
            MoneyError::Overflow => TransferError::AmountTooLarge,
        }
    }
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::RecipientWalletMissing | TransferError::SenderWalletMissing => {
                ErrorKind::Integrity
            }
            TransferError::Storage(_) => ErrorKind::Storage,
            _ => ErrorKind::Validation,
        }
    }

    /// Message safe to show the end user (storage detail is withheld)
    pub fn user_message(&self) -> String {
        match self {
            TransferError::Storage(_) => "Transfer failed. Please try again later.".to_string(),
            other => other.to_string(),
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::MissingFields => "MISSING_FIELDS",
            TransferError::InvalidNumber => "INVALID_NUMBER",
            TransferError::NonPositiveAmount => "INVALID_AMOUNT",
            TransferError::PrecisionOverflow => "PRECISION_OVERFLOW",
            TransferError::AmountTooLarge => "AMOUNT_TOO_LARGE",
            TransferError::SelfTransfer => "SELF_TRANSFER",
            TransferError::RecipientNotFound(_) => "RECIPIENT_NOT_FOUND",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::RecipientWalletMissing => "RECIPIENT_WALLET_MISSING",
            TransferError::SenderWalletMissing => "SENDER_WALLET_MISSING",
            TransferError::Storage(_) => "TRANSFER_FAILED",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::MissingFields
            | TransferError::InvalidNumber
            | TransferError::NonPositiveAmount
            | TransferError::PrecisionOverflow
            | TransferError::AmountTooLarge
            | TransferError::SelfTransfer => 400,
            TransferError::RecipientNotFound(_) | TransferError::InsufficientBalance => 422,
            TransferError::RecipientWalletMissing
            | TransferError::SenderWalletMissing
            | TransferError::Storage(_) => 500,
        }
    }
}
