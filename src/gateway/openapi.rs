//! OpenAPI / Swagger UI Documentation
//!
//! Auto-generated OpenAPI 3.0 documentation for the JSON wallet API.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::handlers::HealthResponse;
use crate::gateway::types::{AccountData, ErrorDetail, LedgerEntryData, TransferData};
use crate::transfer::TransferRequest;

/// Session cookie security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "session",
                    "Session token issued by POST /login (HttpOnly cookie)",
                ))),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MockUPI Wallet API",
        version = "1.0.0",
        description = "Mock peer-to-peer wallet: balances, transfers by UPI ID and transaction history.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::api::get_account,
        crate::gateway::handlers::api::get_history,
        crate::gateway::handlers::api::create_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            AccountData,
            LedgerEntryData,
            TransferData,
            TransferRequest,
            ErrorDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Account", description = "Balance and payment identifier (session required)"),
        (name = "Transfer", description = "Transfers and history (session required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
