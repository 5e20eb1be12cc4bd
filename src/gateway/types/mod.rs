//! Gateway types module
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error envelope with HTTP status
//!
//! ## Submodules
//! - [`response`]: Response types and error codes

pub mod response;

// Re-export commonly used types at module root
pub use response::{
    AccountData, ApiError, ApiResponse, ApiResult, ErrorDetail, LedgerEntryData, TransferData,
    error_codes,
};
