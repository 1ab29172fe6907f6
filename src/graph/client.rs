//! Graph API client
//!
//! One explicitly constructed client, passed by injection into whatever needs
//! it. Each call is stateless: no caching, no retries, a single request
//! timeout from config. Primary fetch failures always propagate classified;
//! only insight enrichment degrades per item (see [`fetch_insights_each`]).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::GraphConfig;
use crate::graph::budget::normalize_budget;
use crate::graph::error::{classify_error, GraphError};
use crate::graph::insights::{buckets_from_response, snapshot_from_response, INSIGHT_FIELDS};
use crate::graph::value::RawNum;
use crate::graph::window::TimeWindow;
use crate::models::{Ad, Campaign, InsightBucket, MetricSnapshot, TokenExchange, TokenMetadata};

const CAMPAIGN_FIELDS: &str = "id,name,status,objective,daily_budget,lifetime_budget";
const AD_FIELDS: &str = "id,name,status";
const LIST_PAGE_LIMIT: &str = "200";

#[derive(Clone)]
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("adboard/0.1.0")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build Graph API HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET a Graph API path and return the parsed JSON body, classifying any
    /// upstream error envelope.
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, GraphError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("graph api GET {path}");

        let response = self.http.get(&url).query(params).send().await?;
        let status = response.status();
        let body: Value = response.json().await?;

        if body.get("error").is_some() || !status.is_success() {
            return Err(classify_error(&body));
        }
        Ok(body)
    }

    async fn insights_query(
        &self,
        entity_id: &str,
        token: &str,
        window: &TimeWindow,
        extra: &[(&str, String)],
    ) -> Result<Value, GraphError> {
        if entity_id.is_empty() {
            return Err(GraphError::MissingParam("entity id"));
        }

        let (window_key, window_value) = window.query_param();
        let mut params = vec![
            ("access_token", token.to_string()),
            ("fields", INSIGHT_FIELDS.to_string()),
            (window_key, window_value),
        ];
        params.extend(extra.iter().cloned());

        self.get_json(&format!("{entity_id}/insights"), &params).await
    }

    /// Fetch and normalize insights for a single entity (account, campaign,
    /// or ad). An empty upstream result is the all-zero snapshot.
    pub async fn entity_insights(
        &self,
        entity_id: &str,
        token: &str,
        window: &TimeWindow,
        objective: &str,
    ) -> Result<MetricSnapshot, GraphError> {
        let body = self.insights_query(entity_id, token, window, &[]).await?;
        Ok(snapshot_from_response(&body, objective))
    }

    /// Fetch insights broken down into one bucket per calendar day.
    pub async fn entity_insights_daily(
        &self,
        entity_id: &str,
        token: &str,
        window: &TimeWindow,
        objective: &str,
    ) -> Result<Vec<InsightBucket>, GraphError> {
        let body = self
            .insights_query(entity_id, token, window, &[("time_increment", "1".to_string())])
            .await?;
        Ok(buckets_from_response(&body, objective))
    }

    /// Fetch campaign insights, resolving the campaign's objective first so
    /// the results count is attributed correctly.
    pub async fn campaign_insights(
        &self,
        campaign_id: &str,
        token: &str,
        window: &TimeWindow,
    ) -> Result<MetricSnapshot, GraphError> {
        let objective = self.entity_objective(campaign_id, token).await?;
        self.entity_insights(campaign_id, token, window, &objective).await
    }

    async fn entity_objective(&self, entity_id: &str, token: &str) -> Result<String, GraphError> {
        if entity_id.is_empty() {
            return Err(GraphError::MissingParam("entity id"));
        }
        let body = self
            .get_json(
                entity_id,
                &[
                    ("access_token", token.to_string()),
                    ("fields", "objective".to_string()),
                ],
            )
            .await?;
        Ok(body
            .get("objective")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    /// List an account's campaigns with normalized budgets, each enriched
    /// with insights for the window. Enrichment failures degrade per item.
    pub async fn list_campaigns(
        &self,
        account_id: &str,
        token: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Campaign>, GraphError> {
        if account_id.is_empty() {
            return Err(GraphError::MissingParam("account id"));
        }

        let path = format!("{}/campaigns", act_prefixed(account_id));
        let body = self
            .get_json(
                &path,
                &[
                    ("access_token", token.to_string()),
                    ("fields", CAMPAIGN_FIELDS.to_string()),
                    ("limit", LIST_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        let rows: Vec<CampaignRow> = rows_from_listing(&body);
        let targets: Vec<(String, String)> = rows
            .iter()
            .map(|row| (row.id.clone(), row.objective.clone().unwrap_or_default()))
            .collect();

        let source: Arc<dyn InsightSource> = Arc::new(self.clone());
        let snapshots = fetch_insights_each(source, targets, token, window).await;

        Ok(rows
            .into_iter()
            .zip(snapshots)
            .map(|(row, insights)| Campaign {
                id: row.id,
                name: row.name.unwrap_or_default(),
                status: row.status.unwrap_or_default(),
                objective: row.objective.unwrap_or_default(),
                daily_budget: normalize_budget(row.daily_budget.as_ref()),
                lifetime_budget: normalize_budget(row.lifetime_budget.as_ref()),
                insights,
            })
            .collect())
    }

    /// List a campaign's ads, each enriched with insights for the window.
    pub async fn list_ads(
        &self,
        campaign_id: &str,
        token: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Ad>, GraphError> {
        if campaign_id.is_empty() {
            return Err(GraphError::MissingParam("campaign id"));
        }

        let body = self
            .get_json(
                &format!("{campaign_id}/ads"),
                &[
                    ("access_token", token.to_string()),
                    ("fields", AD_FIELDS.to_string()),
                    ("limit", LIST_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        let rows: Vec<AdRow> = rows_from_listing(&body);
        let targets: Vec<(String, String)> =
            rows.iter().map(|row| (row.id.clone(), String::new())).collect();

        let source: Arc<dyn InsightSource> = Arc::new(self.clone());
        let snapshots = fetch_insights_each(source, targets, token, window).await;

        Ok(rows
            .into_iter()
            .zip(snapshots)
            .map(|(row, insights)| Ad {
                id: row.id,
                name: row.name.unwrap_or_default(),
                status: row.status.unwrap_or_default(),
                insights,
            })
            .collect())
    }

    /// Exchange a short-lived user token for a long-lived one.
    pub async fn exchange_token(
        &self,
        app_id: &str,
        app_secret: &str,
        short_lived_token: &str,
    ) -> Result<TokenExchange, GraphError> {
        if short_lived_token.is_empty() {
            return Err(GraphError::MissingParam("short-lived token"));
        }

        let body = self
            .get_json(
                "oauth/access_token",
                &[
                    ("grant_type", "fb_exchange_token".to_string()),
                    ("client_id", app_id.to_string()),
                    ("client_secret", app_secret.to_string()),
                    ("fb_exchange_token", short_lived_token.to_string()),
                ],
            )
            .await?;

        Ok(TokenExchange {
            access_token: body
                .get("access_token")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            token_type: body
                .get("token_type")
                .and_then(Value::as_str)
                .unwrap_or("bearer")
                .to_string(),
            expires_in: body.get("expires_in").and_then(Value::as_i64),
        })
    }

    /// Inspect a token's validity and expiry via the debug endpoint, using
    /// the `app_id|app_secret` app token as the inspecting credential.
    pub async fn debug_token(
        &self,
        input_token: &str,
        app_id: &str,
        app_secret: &str,
    ) -> Result<TokenMetadata, GraphError> {
        if input_token.is_empty() {
            return Err(GraphError::MissingParam("input token"));
        }

        let body = self
            .get_json(
                "debug_token",
                &[
                    ("input_token", input_token.to_string()),
                    ("access_token", format!("{app_id}|{app_secret}")),
                ],
            )
            .await?;

        let data = body.get("data").unwrap_or(&Value::Null);
        Ok(TokenMetadata {
            is_valid: data.get("is_valid").and_then(Value::as_bool).unwrap_or(false),
            expires_at: data.get("expires_at").and_then(Value::as_i64),
            app_id: data
                .get("app_id")
                .and_then(Value::as_str)
                .map(str::to_string),
            scopes: data
                .get("scopes")
                .and_then(Value::as_array)
                .map(|scopes| {
                    scopes
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

/// Seam for insight fetching so enrichment fan-out is testable without the
/// network.
#[async_trait]
pub trait InsightSource: Send + Sync {
    async fn entity_insights(
        &self,
        entity_id: &str,
        token: &str,
        window: &TimeWindow,
        objective: &str,
    ) -> Result<MetricSnapshot, GraphError>;
}

#[async_trait]
impl InsightSource for GraphClient {
    async fn entity_insights(
        &self,
        entity_id: &str,
        token: &str,
        window: &TimeWindow,
        objective: &str,
    ) -> Result<MetricSnapshot, GraphError> {
        GraphClient::entity_insights(self, entity_id, token, window, objective).await
    }
}

/// Fetch insights for each (entity id, objective) pair concurrently, one task
/// per item. A failed item degrades to the zero snapshot so one bad entity
/// never fails the batch; results come back in input order.
pub async fn fetch_insights_each(
    source: Arc<dyn InsightSource>,
    targets: Vec<(String, String)>,
    token: &str,
    window: &TimeWindow,
) -> Vec<MetricSnapshot> {
    let mut handles = Vec::with_capacity(targets.len());
    for (entity_id, objective) in targets {
        let source = Arc::clone(&source);
        let token = token.to_string();
        let window = window.clone();
        handles.push(tokio::spawn(async move {
            source
                .entity_insights(&entity_id, &token, &window, &objective)
                .await
                .map_err(|e| (entity_id, e))
        }));
    }

    let mut snapshots = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Ok(snapshot)) => snapshots.push(snapshot),
            Ok(Err((entity_id, e))) => {
                warn!("insight enrichment for {entity_id} failed, zeroing metrics: {e}");
                snapshots.push(MetricSnapshot::default());
            }
            Err(e) => {
                warn!("insight enrichment task aborted: {e}");
                snapshots.push(MetricSnapshot::default());
            }
        }
    }
    snapshots
}

/// Ad-account node ids carry an `act_` prefix on the Graph API; callers may
/// supply the bare numeric id.
pub fn act_prefixed(account_id: &str) -> String {
    if account_id.starts_with("act_") {
        account_id.to_string()
    } else {
        format!("act_{account_id}")
    }
}

fn rows_from_listing<T: for<'de> Deserialize<'de>>(body: &Value) -> Vec<T> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value(row.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct CampaignRow {
    id: String,
    name: Option<String>,
    status: Option<String>,
    objective: Option<String>,
    daily_budget: Option<RawNum>,
    lifetime_budget: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct AdRow {
    id: String,
    name: Option<String>,
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_ids_get_the_act_prefix_exactly_once() {
        assert_eq!(act_prefixed("1234"), "act_1234");
        assert_eq!(act_prefixed("act_1234"), "act_1234");
    }

    #[test]
    fn listing_rows_tolerate_partial_objects() {
        let body = serde_json::json!({
            "data": [
                { "id": "c1", "name": "Spring sale", "objective": "OUTCOME_SALES" },
                { "id": "c2" },
                { "name": "no id, dropped" }
            ]
        });
        let rows: Vec<CampaignRow> = rows_from_listing(&body);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "c1");
        assert!(rows[1].name.is_none());
    }
}
