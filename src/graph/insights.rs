//! Insights response parsing
//!
//! Turns one raw insights response into a [`MetricSnapshot`] (or a list of
//! daily buckets). An empty or absent `data` array is a defined success: the
//! snapshot comes back all-zero, it is never an error.

use serde::Deserialize;
use serde_json::Value;

use crate::graph::actions::resolve_outcomes;
use crate::graph::value::{coerce_f64, coerce_u64, RawNum};
use crate::models::{ActionRecord, InsightBucket, MetricSnapshot};

/// Fields requested on every insights call.
pub const INSIGHT_FIELDS: &str =
    "impressions,clicks,spend,reach,cpm,cpc,ctr,frequency,actions,conversions";

/// One row of an insights response, with every numeric field kept raw until
/// coercion. Deserialization is lenient: anything missing stays None.
#[derive(Debug, Default, Deserialize)]
pub struct InsightRow {
    pub impressions: Option<RawNum>,
    pub clicks: Option<RawNum>,
    pub spend: Option<RawNum>,
    pub reach: Option<RawNum>,
    pub cpm: Option<RawNum>,
    pub cpc: Option<RawNum>,
    pub ctr: Option<RawNum>,
    pub frequency: Option<RawNum>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    pub conversions: Option<RawNum>,
    pub date_start: Option<String>,
    pub date_stop: Option<String>,
}

impl InsightRow {
    /// Normalize this row into a snapshot, coercing each field independently.
    pub fn into_snapshot(self, objective: &str) -> MetricSnapshot {
        let impressions = coerce_u64(self.impressions.as_ref());
        let reach = coerce_u64(self.reach.as_ref());

        let frequency = match self.frequency.as_ref() {
            Some(raw) => raw.as_f64(),
            None if reach > 0 => impressions as f64 / reach as f64,
            None => 0.0,
        };

        let conversions = coerce_u64(self.conversions.as_ref());
        let outcomes = resolve_outcomes(&self.actions, objective, conversions);

        MetricSnapshot {
            impressions,
            clicks: coerce_u64(self.clicks.as_ref()),
            spend: coerce_f64(self.spend.as_ref()),
            reach,
            cpm: coerce_f64(self.cpm.as_ref()),
            cpc: coerce_f64(self.cpc.as_ref()),
            ctr: coerce_f64(self.ctr.as_ref()),
            frequency,
            results: outcomes.results,
            messages: outcomes.messages,
        }
    }
}

fn rows_from_response(body: &Value) -> Vec<InsightRow> {
    body.get("data")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value(row.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a single-window insights response. Empty data yields the zero
/// snapshot.
pub fn snapshot_from_response(body: &Value, objective: &str) -> MetricSnapshot {
    rows_from_response(body)
        .into_iter()
        .next()
        .map(|row| row.into_snapshot(objective))
        .unwrap_or_default()
}

/// Parse a daily-breakdown insights response into one bucket per row,
/// preserving the bucket boundary dates.
pub fn buckets_from_response(body: &Value, objective: &str) -> Vec<InsightBucket> {
    rows_from_response(body)
        .into_iter()
        .map(|row| {
            let date_start = row.date_start.clone().unwrap_or_default();
            let date_stop = row.date_stop.clone().unwrap_or_default();
            InsightBucket {
                date_start,
                date_stop,
                metrics: row.into_snapshot(objective),
            }
        })
        .collect()
}
