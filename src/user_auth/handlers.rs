use axum::{
    Form,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::service::{AuthError, RegistrationError};
use super::session::{self, Session, clear_session_cookie, session_cookie};
use crate::gateway::cookies::{Flash, append_set_cookie, redirect};
use crate::gateway::html::{self, Nav};
use crate::gateway::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn is_logged_in(state: &AppState, headers: &HeaderMap) -> bool {
    matches!(
        session::resolve(state, headers).await,
        Ok(Session::Active(_))
    )
}

/// GET /register
pub async fn register_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if is_logged_in(&state, &headers).await {
        return redirect("/dashboard", None);
    }
    html::render(
        &headers,
        StatusCode::OK,
        "Register",
        Nav::Anonymous,
        None,
        &html::register_body(),
    )
}

/// POST /register
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Response {
    if is_logged_in(&state, &headers).await {
        return redirect("/dashboard", None);
    }

    match state
        .user_auth
        .register(&form.name, &form.email, &form.password)
        .await
    {
        Ok(_) => redirect(
            "/login",
            Some(Flash::success("Registration successful! Please log in.")),
        ),
        Err(e) if e.is_user_error() => {
            tracing::debug!(reason = %e, "Registration rejected");
            redirect("/register", Some(Flash::danger(e.user_message())))
        }
        Err(e @ RegistrationError::Storage(_)) => {
            tracing::error!(error = %e, "Registration failed");
            redirect("/register", Some(Flash::danger(e.user_message())))
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            html::internal_error()
        }
    }
}

/// GET /login
pub async fn login_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if is_logged_in(&state, &headers).await {
        return redirect("/dashboard", None);
    }
    html::render(
        &headers,
        StatusCode::OK,
        "Login",
        Nav::Anonymous,
        None,
        &html::login_body(""),
    )
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if is_logged_in(&state, &headers).await {
        return redirect("/dashboard", None);
    }

    let account = match state.user_auth.login(&form.email, &form.password).await {
        Ok(account) => account,
        Err(e @ AuthError::InvalidCredentials) => {
            tracing::warn!(email = %form.email.trim(), "Login failed");
            return html::render(
                &headers,
                StatusCode::UNAUTHORIZED,
                "Login",
                Nav::Anonymous,
                Some(Flash::danger(e.to_string())),
                &html::login_body(form.email.trim()),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            return html::internal_error();
        }
    };

    let token = match state.user_auth.issue_session(account.id) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, account_id = account.id, "Failed to issue session");
            return html::internal_error();
        }
    };

    tracing::info!(account_id = account.id, upi_id = %account.upi_id, "Login succeeded");

    let mut response = redirect(
        "/dashboard",
        Some(Flash::success(format!("Welcome back, {}!", account.name))),
    );
    append_set_cookie(
        &mut response,
        &session_cookie(&token, state.user_auth.session_ttl(), state.cookie_secure),
    );
    response
}

/// GET /logout
///
/// Clears the session whether or not one exists.
pub async fn logout() -> Response {
    let mut response = redirect(
        "/",
        Some(Flash::info("You have been successfully logged out.")),
    );
    append_set_cookie(&mut response, &clear_session_cookie());
    response
}
