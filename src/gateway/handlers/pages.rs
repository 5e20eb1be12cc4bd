//! HTML wallet pages: landing, dashboard, transfer, history

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

use crate::account::WalletRepository;
use crate::gateway::cookies::{Flash, append_set_cookie, redirect};
use crate::gateway::html::{self, Nav};
use crate::gateway::state::AppState;
use crate::transfer::{TransferRequest, TransferService};
use crate::user_auth::session::{self, Session, clear_session_cookie};
use crate::user_auth::CurrentAccount;

/// GET /
pub async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let nav = match session::resolve(&state, &headers).await {
        Ok(Session::Active(_)) => Nav::Authenticated,
        _ => Nav::Anonymous,
    };
    html::render(
        &headers,
        StatusCode::OK,
        "Home",
        nav,
        None,
        &html::landing_body(nav),
    )
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    headers: HeaderMap,
) -> Response {
    let wallet = match WalletRepository::get_by_account(state.db.pool(), account.id).await {
        Ok(Some(wallet)) => wallet,
        Ok(None) => {
            // Account without wallet: end the session rather than show a
            // half-built page
            tracing::error!(account_id = account.id, "Account has no wallet");
            let mut response = redirect(
                "/",
                Some(Flash::danger(
                    "Wallet not found for your account. Please contact support.",
                )),
            );
            append_set_cookie(&mut response, &clear_session_cookie());
            return response;
        }
        Err(e) => {
            tracing::error!(error = %e, account_id = account.id, "Wallet lookup failed");
            return html::internal_error();
        }
    };

    let qr = match state.qr.clone().ensure_async(account.upi_id.clone()).await {
        Ok(qr) => qr,
        Err(e) => {
            tracing::error!(error = %e, upi_id = %account.upi_id, "QR artifact unavailable");
            return html::internal_error();
        }
    };

    html::render(
        &headers,
        StatusCode::OK,
        "Dashboard",
        Nav::Authenticated,
        None,
        &html::dashboard_body(&account, &wallet, &qr.url()),
    )
}

/// POST /transfer
///
/// Every outcome lands back on the dashboard with a flash.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    Form(req): Form<TransferRequest>,
) -> Response {
    let flash = match TransferService::execute(&state.db, &account, &req).await {
        Ok(receipt) => Flash::success(receipt.message()),
        Err(e) => Flash::danger(e.user_message()),
    };
    redirect("/dashboard", Some(flash))
}

/// GET /history
pub async fn history(
    State(state): State<Arc<AppState>>,
    CurrentAccount(account): CurrentAccount,
    headers: HeaderMap,
) -> Response {
    match TransferService::history(&state.db, &account).await {
        Ok(entries) => html::render(
            &headers,
            StatusCode::OK,
            "History",
            Nav::Authenticated,
            None,
            &html::history_body(&account, &entries),
        ),
        Err(e) => {
            tracing::error!(error = %e, upi_id = %account.upi_id, "History lookup failed");
            html::internal_error()
        }
    }
}
