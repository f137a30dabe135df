//! Mini App backend
//!
//! JSON API used by the web page opened from the `/start` button. Requests
//! that identify a user carry Telegram init data, checked against the bot
//! token before anything else happens.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use sierracore::config::webapp::INIT_DATA_HEADER;
use sierracore::market::{SpotClient, SpotRates};
use sierracore::{validate_init_data, MarketError, MarketSource, MarketSummary, WebAppUser};

use crate::config::Settings;
use crate::storage::{db, get_connection, DbPool};

/// Shared state of the API routes
#[derive(Clone)]
pub struct WebAppState {
    pub db_pool: Arc<DbPool>,
    pub market: Arc<dyn MarketSource>,
    pub spot: Arc<SpotClient>,
    pub settings: Arc<Settings>,
}

#[derive(Debug, Deserialize)]
struct AuthRequest {
    init_data: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub user: Option<WebAppUser>,
    pub auth_date: Option<i64>,
    /// Whether the user has sent `/start` to the bot
    pub registered: bool,
}

/// API error, rendered as `{"error": message}`
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    Upstream(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        log::error!("Market data request failed: {}", err);
        ApiError::Upstream(err.to_string())
    }
}

/// Routes under `/api`
pub fn create_webapp_router(state: WebAppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/market", get(market_summary))
        .route("/api/spot", get(spot_rates))
        .route("/api/auth", post(authenticate))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sierrabravo",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn market_summary(State(state): State<WebAppState>) -> Result<Json<MarketSummary>, ApiError> {
    Ok(Json(state.market.market_summary().await?))
}

async fn spot_rates(State(state): State<WebAppState>) -> Result<Json<SpotRates>, ApiError> {
    Ok(Json(state.spot.fetch_rates().await?))
}

/// Init data comes from the header, or from a JSON body when the header is absent.
fn init_data_from_request(headers: &HeaderMap, body: &[u8]) -> Result<String, ApiError> {
    if let Some(value) = headers.get(INIT_DATA_HEADER) {
        return value
            .to_str()
            .map(str::to_string)
            .map_err(|_| ApiError::BadRequest("Init data header is not valid text".to_string()));
    }

    serde_json::from_slice::<AuthRequest>(body)
        .map(|req| req.init_data)
        .map_err(|_| ApiError::Unauthorized("Missing Telegram init data".to_string()))
}

async fn authenticate(
    State(state): State<WebAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AuthResponse>, ApiError> {
    let init_data = init_data_from_request(&headers, &body)?;

    let validated = validate_init_data(&init_data, state.settings.bot_token.expose_secret()).map_err(|e| {
        log::warn!("Mini App auth failed: {}", e);
        ApiError::Unauthorized("Invalid init data".to_string())
    })?;

    if !validated.is_fresh(state.settings.init_data_max_age, chrono::Utc::now().timestamp()) {
        return Err(ApiError::Unauthorized("Init data expired".to_string()));
    }

    let user = validated
        .user()
        .transpose()
        .map_err(|e| ApiError::BadRequest(format!("Invalid user field: {}", e)))?;

    let registered = match &user {
        Some(user) => {
            let conn = get_connection(&state.db_pool).map_err(|e| ApiError::Internal(format!("DB error: {}", e)))?;
            db::is_registered(&conn, user.id).map_err(|e| ApiError::Internal(format!("DB error: {}", e)))?
        }
        None => false,
    };

    Ok(Json(AuthResponse {
        user,
        auth_date: validated.auth_date(),
        registered,
    }))
}
