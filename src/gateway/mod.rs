pub mod cookies;
pub mod handlers;
pub mod html;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

// OpenAPI / Swagger UI
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth::handlers as auth_handlers;
use state::AppState;

/// Build the complete router: HTML pages, QR images, JSON API and docs
pub fn build_router(state: Arc<AppState>) -> Router {
    let page_routes = Router::new()
        .route("/", get(handlers::index))
        .route(
            "/register",
            get(auth_handlers::register_page).post(auth_handlers::register),
        )
        .route(
            "/login",
            get(auth_handlers::login_page).post(auth_handlers::login),
        )
        .route("/logout", get(auth_handlers::logout))
        .route("/dashboard", get(handlers::dashboard))
        .route("/transfer", post(handlers::transfer))
        .route("/history", get(handlers::history))
        .route("/qrcodes/{file}", get(handlers::qr_image));

    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/account", get(handlers::get_account))
        .route("/history", get(handlers::get_history))
        .route("/transfer", post(handlers::create_transfer));

    Router::new()
        .merge(page_routes)
        .nest("/api/v1", api_routes)
        .with_state(state)
        // Stateless, added after with_state
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Start the HTTP gateway and serve until the process stops
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            port
        )
    })?;

    tracing::info!(%addr, "Gateway listening");
    println!("🚀 Gateway listening on http://{}", addr);
    println!("📖 API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
