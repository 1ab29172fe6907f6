use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::handlers::{
    account_campaigns, account_insights, account_insights_daily, ad_insights, campaign_ads,
    campaign_insights, create_campaign, debug_token, delete_account, delete_campaign,
    exchange_token, health_check, list_accounts, notify_test, update_campaign, upsert_account,
    AppState,
};

pub fn create_api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/accounts", get(list_accounts).post(upsert_account))
        .route("/api/accounts/{id}", delete(delete_account))
        .route("/api/accounts/{id}/insights", get(account_insights))
        .route("/api/accounts/{id}/insights/daily", get(account_insights_daily))
        .route("/api/accounts/{id}/campaigns", get(account_campaigns))
        .route("/api/campaigns", post(create_campaign))
        .route("/api/campaigns/{id}", put(update_campaign).delete(delete_campaign))
        .route("/api/campaigns/{id}/insights", get(campaign_insights))
        .route("/api/campaigns/{id}/ads", get(campaign_ads))
        .route("/api/ads/{id}/insights", get(ad_insights))
        .route("/api/token/exchange", post(exchange_token))
        .route("/api/token/debug", get(debug_token))
        .route("/api/notify/test", post(notify_test))
        // the dashboard frontend is served from a different origin in dev
        .layer(CorsLayer::permissive())
        .with_state(state)
}
