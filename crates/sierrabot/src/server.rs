//! HTTP server: Telegram webhook, Mini App API and static files on one port.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use secrecy::ExposeSecret;
use sierracore::market::SpotClient;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::telegram::handlers::{handle_update, HandlerDeps};
use crate::telegram::update::Update;
use crate::telegram::webapp::{create_webapp_router, WebAppState};

/// Header Telegram echoes the `secret_token` from `setWebhook` in
pub const WEBHOOK_SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Builds the full router.
///
/// `POST /webhook` and `POST /` take updates; everything that is not an API
/// route is served from the static directory.
pub fn create_router(deps: HandlerDeps, spot: Arc<SpotClient>) -> Router {
    let static_files = ServeDir::new(&deps.settings.static_dir);

    let webapp = create_webapp_router(WebAppState {
        db_pool: Arc::clone(&deps.db_pool),
        market: Arc::clone(&deps.market),
        spot,
        settings: Arc::clone(&deps.settings),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/webhook", post(telegram_webhook))
        .route("/", post(telegram_webhook).fallback_service(static_files.clone()))
        .with_state(deps)
        .merge(webapp)
        .fallback_service(static_files)
        .layer(cors)
}

/// `true` when no secret is configured or the header carries it.
fn webhook_authorized(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(WEBHOOK_SECRET_HEADER)
        .map(|value| value.as_bytes() == expected.as_bytes())
        .unwrap_or(false)
}

/// Runs the update to completion, then answers `200 OK` whatever the
/// handler did, so Telegram does not redeliver it.
async fn telegram_webhook(
    State(deps): State<HandlerDeps>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    let secret = deps.settings.webhook_secret.as_ref().map(|s| s.expose_secret());
    if !webhook_authorized(&headers, secret) {
        log::warn!("Rejected webhook call {} with a wrong secret token", update.update_id);
        return StatusCode::UNAUTHORIZED;
    }

    handle_update(&deps, update).await;
    StatusCode::OK
}

/// Binds `0.0.0.0:port` and serves until Ctrl+C.
pub async fn run_server(router: Router, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Starting web server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
