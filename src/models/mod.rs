//! Data models shared across the Graph API layer and the HTTP surface

use serde::{Deserialize, Serialize};

use crate::graph::value::RawNum;

/// Normalized performance metrics for one entity over one time window.
///
/// Every field is a well-defined number: absent or malformed upstream values
/// coerce to zero, never to null or a string. A snapshot is built fresh per
/// request and immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub impressions: u64,
    pub clicks: u64,
    pub spend: f64,
    pub reach: u64,
    pub cpm: f64,
    pub cpc: f64,
    pub ctr: f64,
    /// impressions / reach when not supplied upstream and reach > 0
    pub frequency: f64,
    /// Headline outcome count, semantics depend on the campaign objective
    pub results: u64,
    /// Messaging conversations started
    pub messages: u64,
}

/// One calendar-day bucket of a daily insights breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightBucket {
    pub date_start: String,
    pub date_stop: String,
    #[serde(flatten)]
    pub metrics: MetricSnapshot,
}

/// One tagged action line from an upstream insights row.
///
/// `action_type` is an upstream-controlled vocabulary; `value` arrives as a
/// number or a numeric string depending on the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_type: String,
    pub value: Option<RawNum>,
}

/// Campaign listing entry, enriched with normalized budget and insights.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: String,
    pub objective: String,
    /// Major currency units; None when no budget is set
    pub daily_budget: Option<f64>,
    pub lifetime_budget: Option<f64>,
    pub insights: MetricSnapshot,
}

/// Ad listing entry.
#[derive(Debug, Clone, Serialize)]
pub struct Ad {
    pub id: String,
    pub name: String,
    pub status: String,
    pub insights: MetricSnapshot,
}

/// A persisted ad-account credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAccount {
    pub account_id: String,
    pub name: String,
    pub access_token: String,
    /// Unix timestamp; None when the expiry is unknown
    pub token_expires_at: Option<i64>,
}

/// Result of a short-lived for long-lived token exchange.
#[derive(Debug, Clone, Serialize)]
pub struct TokenExchange {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry, when the upstream reports one
    pub expires_in: Option<i64>,
}

/// Metadata about an access token, from the token-debug endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TokenMetadata {
    pub is_valid: bool,
    /// Unix timestamp; 0 means the token never expires
    pub expires_at: Option<i64>,
    pub app_id: Option<String>,
    pub scopes: Vec<String>,
}
