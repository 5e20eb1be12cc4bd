//! Server-rendered pages
//!
//! Every interpolated value goes through [`escape`].

use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};

use super::cookies::{FLASH_COOKIE, Flash, append_set_cookie, expire_cookie};
use crate::account::{Account, Wallet};
use crate::money::CURRENCY_SYMBOL;
use crate::transfer::{Direction, LedgerEntry};

/// Which navigation links the layout shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Anonymous,
    Authenticated,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, nav: Nav, flash: Option<&Flash>, body: &str) -> String {
    let links = match nav {
        Nav::Anonymous => r#"<a href="/login">Login</a> | <a href="/register">Register</a>"#,
        Nav::Authenticated => {
            r#"<a href="/dashboard">Dashboard</a> | <a href="/history">History</a> | <a href="/logout">Logout</a>"#
        }
    };
    let flash = flash
        .map(|f| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - MockUPI</title>
</head>
<body>
<nav><a href="/">MockUPI</a> | {links}</nav>
{flash}
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        links = links,
        flash = flash,
        body = body,
    )
}

/// Render a page. Shows `inline` if given, otherwise the pending flash
/// cookie, which is expired either way.
pub fn render(
    headers: &HeaderMap,
    status: StatusCode,
    title: &str,
    nav: Nav,
    inline: Option<Flash>,
    body: &str,
) -> Response {
    let pending = Flash::from_headers(headers);
    let shown = inline.or_else(|| pending.clone());
    let mut response = (status, Html(layout(title, nav, shown.as_ref(), body))).into_response();
    if pending.is_some() {
        append_set_cookie(&mut response, &expire_cookie(FLASH_COOKIE));
    }
    response
}

/// Bare 500 page; detail stays in the logs
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(layout(
            "Error",
            Nav::Anonymous,
            None,
            "<h1>Something went wrong</h1><p>Please try again later.</p>",
        )),
    )
        .into_response()
}

pub fn landing_body(nav: Nav) -> String {
    let cta = match nav {
        Nav::Anonymous => {
            r#"<p><a href="/register">Create an account</a> or <a href="/login">log in</a>.</p>"#
        }
        Nav::Authenticated => r#"<p><a href="/dashboard">Go to your dashboard</a>.</p>"#,
    };
    format!(
        "<h1>MockUPI Wallet</h1>\n<p>Send mock money to anyone by UPI ID. Every new account starts with {}1000.00.</p>\n{}",
        CURRENCY_SYMBOL, cta
    )
}

pub fn register_body() -> String {
    r#"<h1>Register</h1>
<form method="post" action="/register">
<label>Name <input type="text" name="name" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Register</button>
</form>
<p>Already registered? <a href="/login">Log in</a>.</p>"#
        .to_string()
}

pub fn login_body(email: &str) -> String {
    format!(
        r#"<h1>Login</h1>
<form method="post" action="/login">
<label>Email <input type="email" name="email" value="{}" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>New here? <a href="/register">Register</a>.</p>"#,
        escape(email)
    )
}

pub fn dashboard_body(account: &Account, wallet: &Wallet, qr_url: &str) -> String {
    format!(
        r#"<h1>Welcome, {name}</h1>
<section class="wallet">
<p>Your UPI ID: <strong>{upi_id}</strong></p>
<p>Balance: <strong>{symbol}{balance}</strong></p>
<img src="{qr_url}" alt="QR code for {upi_id}" width="200" height="200">
</section>
<section class="transfer">
<h2>Send money</h2>
<form method="post" action="/transfer">
<label>Recipient UPI ID <input type="text" name="recipient_upi_id" required></label>
<label>Amount <input type="text" name="amount" inputmode="decimal" required></label>
<label>Description <input type="text" name="description" placeholder="UPI Transfer"></label>
<button type="submit">Send</button>
</form>
</section>
<p><a href="/history">View transaction history</a></p>"#,
        name = escape(&account.name),
        upi_id = escape(&account.upi_id),
        symbol = CURRENCY_SYMBOL,
        balance = wallet.balance,
        qr_url = escape(qr_url),
    )
}

pub fn history_body(account: &Account, entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "<h1>Transaction History</h1>\n<p>No transactions yet.</p>".to_string();
    }

    let rows: String = entries
        .iter()
        .map(|entry| {
            let (label, sign) = match entry.direction_for(&account.upi_id) {
                Direction::Sent => ("Sent to", "-"),
                Direction::Received => ("Received from", "+"),
            };
            format!(
                "<tr><td>{}</td><td>{} {}</td><td>{}{}{}</td><td>{}</td></tr>\n",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                label,
                escape(entry.counterparty_for(&account.upi_id)),
                sign,
                CURRENCY_SYMBOL,
                entry.amount,
                escape(entry.description.as_deref().unwrap_or("")),
            )
        })
        .collect();

    format!(
        r#"<h1>Transaction History</h1>
<table>
<thead><tr><th>Date</th><th>Party</th><th>Amount</th><th>Description</th></tr></thead>
<tbody>
{}</tbody>
</table>"#,
        rows
    )
}
