//! JSON wallet API
//!
//! Same operations as the HTML pages, answered in the `ApiResponse`
//! envelope. Authentication is the session cookie.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use crate::account::WalletRepository;
use crate::gateway::state::AppState;
use crate::gateway::types::{
    AccountData, ApiError, ApiResponse, ApiResult, LedgerEntryData, TransferData, error_codes,
};
use crate::transfer::{TransferRequest, TransferService};
use crate::user_auth::ApiAccount;

/// Current account, balance and QR image path
#[utoipa::path(
    get,
    path = "/api/v1/account",
    responses(
        (status = 200, description = "Account summary", body = AccountData),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Wallet missing or storage failure")
    ),
    security(("session_cookie" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    ApiAccount(account): ApiAccount,
) -> ApiResult<AccountData> {
    let wallet = WalletRepository::get_by_account(state.db.pool(), account.id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, account_id = account.id, "Wallet lookup failed");
            ApiError::internal("Failed to load wallet")
        })?
        .ok_or_else(|| {
            tracing::error!(account_id = account.id, "Account has no wallet");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTEGRITY_ERROR,
                "WALLET_MISSING",
                "Wallet not found for your account. Please contact support.",
            )
        })?;

    let qr = state
        .qr
        .clone()
        .ensure_async(account.upi_id.clone())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, upi_id = %account.upi_id, "QR artifact unavailable");
            ApiError::internal("QR code unavailable")
        })?;

    Ok(Json(ApiResponse::success(AccountData::new(
        &account,
        &wallet,
        qr.url(),
    ))))
}

/// Ledger entries involving the current account, newest first
#[utoipa::path(
    get,
    path = "/api/v1/history",
    responses(
        (status = 200, description = "Transaction history", body = Vec<LedgerEntryData>),
        (status = 401, description = "Not logged in")
    ),
    security(("session_cookie" = [])),
    tag = "Transfer"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    ApiAccount(account): ApiAccount,
) -> ApiResult<Vec<LedgerEntryData>> {
    let entries = TransferService::history(&state.db, &account)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, upi_id = %account.upi_id, "History lookup failed");
            ApiError::internal("Failed to load history")
        })?;

    let data = entries
        .iter()
        .map(|entry| LedgerEntryData::for_viewer(entry, &account.upi_id))
        .collect();
    Ok(Json(ApiResponse::success(data)))
}

/// Send money to another payment identifier
#[utoipa::path(
    post,
    path = "/api/v1/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferData),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not logged in"),
        (status = 422, description = "Recipient not found or insufficient balance"),
        (status = 500, description = "Integrity or storage failure")
    ),
    security(("session_cookie" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    ApiAccount(account): ApiAccount,
    Json(req): Json<TransferRequest>,
) -> ApiResult<TransferData> {
    let receipt = TransferService::execute(&state.db, &account, &req).await?;
    Ok(Json(ApiResponse::success(TransferData::from(&receipt))))
}
