//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: error response carrying HTTP status and envelope code
//! - `error_codes`: Standard error code constants
//! - Wallet response DTOs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::{Account, Wallet};
use crate::transfer::{Direction, ErrorKind, LedgerEntry, TransferError, TransferReceipt};

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or error detail (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Machine-readable error detail placed in `data` of an error envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = "INSUFFICIENT_BALANCE")]
    pub error: String,
}

/// Error response: HTTP status plus `ApiResponse` envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub error: &'static str,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, error: &'static str, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            error,
            msg: msg.into(),
        }
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, "UNAUTHORIZED", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "INTERNAL_ERROR",
            msg,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.code,
            msg: self.msg,
            data: Some(ErrorDetail {
                error: self.error.to_string(),
            }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match &e {
            TransferError::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
            TransferError::RecipientNotFound(_) => error_codes::RECIPIENT_NOT_FOUND,
            _ => match e.kind() {
                ErrorKind::Validation => error_codes::INVALID_PARAMETER,
                ErrorKind::Integrity => error_codes::INTEGRITY_ERROR,
                ErrorKind::Storage => error_codes::INTERNAL_ERROR,
            },
        };
        Self::new(status, code, e.code(), e.user_message())
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// Response DTOs
// ============================================================================

/// Account summary for the logged-in user
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountData {
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@x.com")]
    pub email: String,
    #[schema(example = "alice@mockupi")]
    pub upi_id: String,
    /// Balance with two decimals
    #[schema(example = "1000.00")]
    pub balance: String,
    #[schema(example = "INR")]
    pub currency: String,
    /// Public path of the payment QR image
    #[schema(example = "/qrcodes/0cc175b9c0f1b6a831c399e269772661.png")]
    pub qr_url: String,
}

impl AccountData {
    pub fn new(account: &Account, wallet: &Wallet, qr_url: String) -> Self {
        Self {
            name: account.name.clone(),
            email: account.email.clone(),
            upi_id: account.upi_id.clone(),
            balance: wallet.balance.to_string(),
            currency: crate::money::CURRENCY.to_string(),
            qr_url,
        }
    }
}

/// One ledger entry as seen by the requesting account
#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryData {
    pub id: i64,
    /// "sent" or "received"
    #[schema(example = "sent")]
    pub direction: String,
    #[schema(example = "alice@mockupi")]
    pub sender_upi_id: String,
    #[schema(example = "bob@mockupi")]
    pub receiver_upi_id: String,
    #[schema(example = "300.00")]
    pub amount: String,
    #[schema(example = "UPI Transfer")]
    pub description: Option<String>,
    #[schema(example = 1703494800000_i64)]
    pub timestamp_ms: i64,
}

impl LedgerEntryData {
    pub fn for_viewer(entry: &LedgerEntry, viewer_upi_id: &str) -> Self {
        let direction = match entry.direction_for(viewer_upi_id) {
            Direction::Sent => "sent",
            Direction::Received => "received",
        };
        Self {
            id: entry.id,
            direction: direction.to_string(),
            sender_upi_id: entry.sender_upi_id.clone(),
            receiver_upi_id: entry.receiver_upi_id.clone(),
            amount: entry.amount.to_string(),
            description: entry.description.clone(),
            timestamp_ms: entry.created_at.timestamp_millis(),
        }
    }
}

/// Committed transfer
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferData {
    pub entry_id: i64,
    #[schema(example = "bob@mockupi")]
    pub to: String,
    #[schema(example = "300.00")]
    pub amount: String,
    /// Sender balance after the transfer
    #[schema(example = "700.00")]
    pub balance: String,
    #[schema(example = "Successfully sent ₹300.00 to bob@mockupi.")]
    pub message: String,
    pub timestamp_ms: i64,
}

impl From<&TransferReceipt> for TransferData {
    fn from(receipt: &TransferReceipt) -> Self {
        Self {
            entry_id: receipt.entry.id,
            to: receipt.entry.receiver_upi_id.clone(),
            amount: receipt.entry.amount.to_string(),
            balance: receipt.sender_balance.to_string(),
            message: receipt.message(),
            timestamp_ms: receipt.entry.created_at.timestamp_millis(),
        }
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const RECIPIENT_NOT_FOUND: i32 = 1003;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const INTEGRITY_ERROR: i32 = 5002;
}
