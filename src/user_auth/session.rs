//! Session cookie and the extractors that gate protected routes
//!
//! The session is a signed token in an HttpOnly cookie. A request carries no
//! token (anonymous), a token that fails verification (rejected), a token for
//! a live account, or a valid token whose account has since disappeared
//! (stale). Rejected and stale cookies are cleared on sight.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Duration;
use std::sync::Arc;

use super::service::AuthError;
use crate::account::Account;
use crate::gateway::cookies::{Flash, append_set_cookie, expire_cookie, read_cookie, redirect};
use crate::gateway::html;
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiError, error_codes};

pub const SESSION_COOKIE: &str = "session";

pub const STALE_SESSION_MESSAGE: &str = "User not found. Please log in again.";

#[derive(Debug)]
pub enum Session {
    Anonymous,
    /// Cookie present but tampered, signed with another key or expired
    Rejected,
    Active(Account),
    Stale,
}

/// Classify the request's session. Only a storage failure is an error.
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Session, sqlx::Error> {
    let Some(token) = read_cookie(headers, SESSION_COOKIE) else {
        return Ok(Session::Anonymous);
    };

    match state.user_auth.session_account(&token).await {
        Ok(Some(account)) => Ok(Session::Active(account)),
        Ok(None) => Ok(Session::Stale),
        Err(AuthError::Storage(e)) => Err(e),
        Err(_) => Ok(Session::Rejected),
    }
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie() -> String {
    expire_cookie(SESSION_COOKIE)
}

fn login_prompt(path: &str) -> &'static str {
    match path {
        "/dashboard" => "Please log in to view your dashboard.",
        "/transfer" => "Please log in to make a transfer.",
        "/history" => "Please log in to view your transaction history.",
        _ => "Please log in to continue.",
    }
}

/// Account behind the session of an HTML route; rejects with a redirect to
/// the login page
pub struct CurrentAccount(pub Account);

impl FromRequestParts<Arc<AppState>> for CurrentAccount {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match resolve(state, &parts.headers).await {
            Ok(Session::Active(account)) => Ok(CurrentAccount(account)),
            Ok(Session::Anonymous) => Err(redirect(
                "/login",
                Some(Flash::warning(login_prompt(parts.uri.path()))),
            )),
            Ok(Session::Rejected) => {
                tracing::debug!(path = %parts.uri.path(), "Discarding unverifiable session cookie");
                let mut response = redirect(
                    "/login",
                    Some(Flash::warning(login_prompt(parts.uri.path()))),
                );
                append_set_cookie(&mut response, &clear_session_cookie());
                Err(response)
            }
            Ok(Session::Stale) => {
                tracing::warn!(path = %parts.uri.path(), "Session refers to a missing account");
                let mut response = redirect("/login", Some(Flash::danger(STALE_SESSION_MESSAGE)));
                append_set_cookie(&mut response, &clear_session_cookie());
                Err(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(html::internal_error())
            }
        }
    }
}

/// Account behind the session of a JSON route; rejects with 401 in the
/// `ApiResponse` envelope
pub struct ApiAccount(pub Account);

impl FromRequestParts<Arc<AppState>> for ApiAccount {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match resolve(state, &parts.headers).await {
            Ok(Session::Active(account)) => Ok(ApiAccount(account)),
            Ok(Session::Anonymous) => Err(ApiError::unauthorized(
                error_codes::MISSING_AUTH,
                "Please log in to continue.",
            )
            .into_response()),
            Ok(Session::Rejected) => {
                let mut response =
                    ApiError::unauthorized(error_codes::MISSING_AUTH, "Please log in to continue.")
                        .into_response();
                append_set_cookie(&mut response, &clear_session_cookie());
                Err(response)
            }
            Ok(Session::Stale) => {
                let mut response =
                    ApiError::unauthorized(error_codes::AUTH_FAILED, STALE_SESSION_MESSAGE)
                        .into_response();
                append_set_cookie(&mut response, &clear_session_cookie());
                Err(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed");
                Err(ApiError::internal("Session lookup failed").into_response())
            }
        }
    }
}
