use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::config::AppCredentials;
use crate::graph::client::act_prefixed;
use crate::graph::{GraphClient, GraphError, TimeWindow, WindowResolver};
use crate::models::{
    Ad, Campaign, InsightBucket, MetricSnapshot, StoredAccount, TokenExchange, TokenMetadata,
};
use crate::notify::TelegramNotifier;
use crate::storage::AccountStore;

pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub graph: Arc<GraphClient>,
    pub windows: WindowResolver,
    pub notifier: Option<TelegramNotifier>,
    pub app: Option<AppCredentials>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable kind so the frontend can route token expiry to the
    /// re-authentication flow instead of a generic error banner.
    pub kind: &'static str,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, kind: &'static str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            kind,
        }),
    )
}

fn map_graph_error(e: GraphError) -> ApiError {
    match &e {
        GraphError::TokenExpired { .. } => {
            error_response(StatusCode::UNAUTHORIZED, "token_expired", e.to_string())
        }
        GraphError::MissingParam(_) => {
            error_response(StatusCode::BAD_REQUEST, "bad_request", e.to_string())
        }
        GraphError::Api(_) => {
            error_response(StatusCode::BAD_GATEWAY, "upstream_error", e.to_string())
        }
        GraphError::Http(_) => {
            error_response(StatusCode::BAD_GATEWAY, "upstream_unreachable", e.to_string())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolve the access token for a request: an Authorization bearer header
/// wins, otherwise the stored credential for `account_id`.
async fn resolve_token(
    state: &AppState,
    headers: &HeaderMap,
    account_id: Option<&str>,
) -> Result<String, ApiError> {
    if let Some(token) = bearer_token(headers) {
        return Ok(token);
    }

    let account_id = account_id.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "account_id is required when no bearer token is supplied",
        )
    })?;

    match state.store.resolve_token(account_id).await {
        Ok(Some(token)) => Ok(token),
        Ok(None) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "token_missing",
            format!("no stored access token for account {account_id}"),
        )),
        Err(e) => {
            tracing::error!("account store lookup failed: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to read account store",
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub date_preset: Option<String>,
    /// Custom range start (YYYY-MM-DD); with `until`, bypasses presets
    pub since: Option<String>,
    pub until: Option<String>,
    /// Translate the preset into concrete dates in the reference timezone
    /// (default true); false passes the preset through to the upstream
    pub translate_preset: Option<bool>,
    /// Account whose stored token should authorize the call
    pub account_id: Option<String>,
}

/// Pick the time window for a request. A caller-supplied since/until pair
/// passes through verbatim; the upstream only honors date granularity, so
/// any clock time in the input is informational and silently coarsened.
fn select_window(resolver: &WindowResolver, query: &InsightsQuery) -> TimeWindow {
    if let (Some(since), Some(until)) = (&query.since, &query.until) {
        return TimeWindow::Range {
            since: since.clone(),
            until: until.clone(),
        };
    }

    let preset = query.date_preset.as_deref().unwrap_or("last_7d");
    resolver.resolve(preset, query.translate_preset.unwrap_or(true))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// List stored ad accounts (tokens redacted)
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Value>>, ApiError> {
    match state.store.list().await {
        Ok(accounts) => Ok(Json(
            accounts
                .into_iter()
                .map(|a| {
                    json!({
                        "account_id": a.account_id,
                        "name": a.name,
                        "token_expires_at": a.token_expires_at,
                    })
                })
                .collect(),
        )),
        Err(e) => {
            tracing::error!("failed to list accounts: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to list accounts",
            ))
        }
    }
}

/// Store or replace an ad-account credential
pub async fn upsert_account(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<StoredAccount>,
) -> Result<(StatusCode, Json<SuccessResponse>), ApiError> {
    if payload.account_id.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "account_id cannot be empty",
        ));
    }
    if payload.access_token.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "access_token cannot be empty",
        ));
    }

    let account_id = payload.account_id.clone();
    match state.store.upsert(payload).await {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(SuccessResponse {
                message: format!("account {account_id} saved"),
            }),
        )),
        Err(e) => {
            tracing::error!("failed to save account {account_id}: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to save account",
            ))
        }
    }
}

pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.store.remove(&account_id).await {
        Ok(true) => Ok(Json(SuccessResponse {
            message: format!("account {account_id} removed"),
        })),
        Ok(false) => Err(error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("account {account_id} not found"),
        )),
        Err(e) => {
            tracing::error!("failed to remove account {account_id}: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "failed to remove account",
            ))
        }
    }
}

/// Account-level insights over a preset or custom range
pub async fn account_insights(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<MetricSnapshot>, ApiError> {
    let token = resolve_token(&state, &headers, Some(&account_id)).await?;
    let window = select_window(&state.windows, &query);
    let entity = act_prefixed(&account_id);

    state
        .graph
        .entity_insights(&entity, &token, &window, "")
        .await
        .map(Json)
        .map_err(map_graph_error)
}

/// Account-level insights with one bucket per calendar day
pub async fn account_insights_daily(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<InsightBucket>>, ApiError> {
    let token = resolve_token(&state, &headers, Some(&account_id)).await?;
    let window = select_window(&state.windows, &query);
    let entity = act_prefixed(&account_id);

    state
        .graph
        .entity_insights_daily(&entity, &token, &window, "")
        .await
        .map(Json)
        .map_err(map_graph_error)
}

/// List an account's campaigns with budgets and enriched insights
pub async fn account_campaigns(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Campaign>>, ApiError> {
    let token = resolve_token(&state, &headers, Some(&account_id)).await?;
    let window = select_window(&state.windows, &query);

    state
        .graph
        .list_campaigns(&account_id, &token, &window)
        .await
        .map(Json)
        .map_err(map_graph_error)
}

pub async fn campaign_insights(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<MetricSnapshot>, ApiError> {
    let token = resolve_token(&state, &headers, query.account_id.as_deref()).await?;
    let window = select_window(&state.windows, &query);

    state
        .graph
        .campaign_insights(&campaign_id, &token, &window)
        .await
        .map(Json)
        .map_err(map_graph_error)
}

pub async fn campaign_ads(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Ad>>, ApiError> {
    let token = resolve_token(&state, &headers, query.account_id.as_deref()).await?;
    let window = select_window(&state.windows, &query);

    state
        .graph
        .list_ads(&campaign_id, &token, &window)
        .await
        .map(Json)
        .map_err(map_graph_error)
}

pub async fn ad_insights(
    State(state): State<Arc<AppState>>,
    Path(ad_id): Path<String>,
    Query(query): Query<InsightsQuery>,
    headers: HeaderMap,
) -> Result<Json<MetricSnapshot>, ApiError> {
    let token = resolve_token(&state, &headers, query.account_id.as_deref()).await?;
    let window = select_window(&state.windows, &query);

    state
        .graph
        .entity_insights(&ad_id, &token, &window, "")
        .await
        .map(Json)
        .map_err(map_graph_error)
}

/// Campaign mutation is not supported; the create/update/delete endpoints
/// echo their input so the frontend's forms stay wired up.
pub async fn create_campaign(Json(payload): Json<Value>) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(payload))
}

pub async fn update_campaign(
    Path(campaign_id): Path<String>,
    Json(mut payload): Json<Value>,
) -> Json<Value> {
    if let Some(object) = payload.as_object_mut() {
        object.entry("id").or_insert(json!(campaign_id));
    }
    Json(payload)
}

pub async fn delete_campaign(Path(campaign_id): Path<String>) -> Json<Value> {
    Json(json!({ "id": campaign_id }))
}

#[derive(Debug, Deserialize)]
pub struct ExchangeTokenRequest {
    pub short_lived_token: String,
}

fn app_credentials(state: &AppState) -> Result<&AppCredentials, ApiError> {
    state.app.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "app_not_configured",
            "FB_APP_ID and FB_APP_SECRET must be configured for token operations",
        )
    })
}

/// Exchange a short-lived token for a long-lived one
pub async fn exchange_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExchangeTokenRequest>,
) -> Result<Json<TokenExchange>, ApiError> {
    let app = app_credentials(&state)?;

    state
        .graph
        .exchange_token(&app.app_id, &app.app_secret, &payload.short_lived_token)
        .await
        .map(Json)
        .map_err(map_graph_error)
}

#[derive(Debug, Deserialize)]
pub struct DebugTokenQuery {
    pub input_token: String,
}

/// Inspect a token's validity and expiry
pub async fn debug_token(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DebugTokenQuery>,
) -> Result<Json<TokenMetadata>, ApiError> {
    let app = app_credentials(&state)?;

    state
        .graph
        .debug_token(&query.input_token, &app.app_id, &app.app_secret)
        .await
        .map(Json)
        .map_err(map_graph_error)
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub text: String,
}

/// Send a test message through the Telegram sink
pub async fn notify_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NotifyRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let notifier = state.notifier.as_ref().ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "notifications_disabled",
            "Telegram notifications are not configured",
        )
    })?;

    match notifier.send_message(&payload.text).await {
        Ok(()) => Ok(Json(SuccessResponse {
            message: "notification sent".to_string(),
        })),
        Err(e) => {
            tracing::error!("telegram notification failed: {e}");
            Err(error_response(
                StatusCode::BAD_GATEWAY,
                "notify_error",
                "failed to deliver notification",
            ))
        }
    }
}
