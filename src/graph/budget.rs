//! Budget normalization
//!
//! The Graph API reports campaign budgets without a unit indicator: for
//! minor-unit currencies (USD, EUR) the value is in cents, for currencies
//! without a minor unit (VND, JPY on some accounts) it is already the major
//! amount. There is no field that says which, so a magnitude heuristic
//! disambiguates. Known-fragile; see the open questions in DESIGN.md.

use crate::graph::value::RawNum;

/// Values at or above this are assumed to be minor subunits (cents).
const MINOR_UNIT_THRESHOLD: f64 = 10_000_000.0;

/// Normalize a raw budget value to major currency units.
///
/// Returns None for "no budget set": absent, null, zero, or unparseable.
pub fn normalize_budget(raw: Option<&RawNum>) -> Option<f64> {
    let parsed = match raw? {
        RawNum::Num(n) if n.is_finite() => *n,
        RawNum::Num(_) => return None,
        RawNum::Text(s) => s.trim().parse::<f64>().ok()?,
    };

    if parsed <= 0.0 {
        return None;
    }

    if parsed >= MINOR_UNIT_THRESHOLD {
        Some(parsed / 100.0)
    } else {
        Some(parsed)
    }
}
