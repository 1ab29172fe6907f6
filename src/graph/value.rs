//! Coercion for the Graph API's loosely typed numeric fields
//!
//! The upstream API is inconsistent about returning numbers vs numeric
//! strings, per field and per endpoint. Everything numeric in a response is
//! deserialized into [`RawNum`] and funneled through the two coercion
//! functions here instead of ad hoc checks at each call site.

use serde::{Deserialize, Serialize};

/// A numeric value as the Graph API actually sends it: a JSON number or a
/// numeric string. Absence is modeled as `Option<RawNum>` at the field level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNum {
    Num(f64),
    Text(String),
}

impl RawNum {
    /// Decimal coercion: parse strings as floats, pass numbers through,
    /// default to 0 on anything unparseable.
    pub fn as_f64(&self) -> f64 {
        match self {
            RawNum::Num(n) if n.is_finite() => *n,
            RawNum::Num(_) => 0.0,
            RawNum::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        }
    }

    /// Integer coercion: strings go through integer parsing (not float
    /// truncation), numbers are truncated, negatives and garbage become 0.
    pub fn as_u64(&self) -> u64 {
        match self {
            RawNum::Num(n) if n.is_finite() && *n >= 0.0 => *n as u64,
            RawNum::Num(_) => 0,
            RawNum::Text(s) => s.trim().parse::<u64>().unwrap_or(0),
        }
    }
}

/// Coerce an optional raw decimal field, defaulting to 0.
pub fn coerce_f64(raw: Option<&RawNum>) -> f64 {
    raw.map(RawNum::as_f64).unwrap_or(0.0)
}

/// Coerce an optional raw integer field, defaulting to 0.
pub fn coerce_u64(raw: Option<&RawNum>) -> u64 {
    raw.map(RawNum::as_u64).unwrap_or(0)
}
