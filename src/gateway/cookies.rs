//! Cookie plumbing: header parsing and one-shot flash messages
//!
//! A flash is a message carried across exactly one redirect. It travels as a
//! base64 JSON cookie set on the redirect and expired by the page that shows
//! it.

use axum::{
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Redirect, Response},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

/// Value of cookie `name` from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// `Set-Cookie` value that removes cookie `name`
pub fn expire_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Append a `Set-Cookie` header; a value that is not a valid header is dropped
pub fn append_set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(e) => tracing::warn!(error = %e, "Dropping malformed Set-Cookie value"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn new(level: FlashLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Danger, message)
    }

    fn encode(&self) -> Option<String> {
        serde_json::to_vec(self)
            .ok()
            .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// `Set-Cookie` value carrying this flash
    pub fn to_cookie(&self) -> Option<String> {
        self.encode()
            .map(|v| format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, v))
    }

    /// Pending flash on the request, if any. Garbage is ignored.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        read_cookie(headers, FLASH_COOKIE).and_then(|raw| Self::decode(&raw))
    }
}

/// 303 redirect, optionally carrying a flash
pub fn redirect(to: &str, flash: Option<Flash>) -> Response {
    let mut response = Redirect::to(to).into_response();
    if let Some(cookie) = flash.as_ref().and_then(Flash::to_cookie) {
        append_set_cookie(&mut response, &cookie);
    }
    response
}
