//! Action-taxonomy resolution
//!
//! Derives the single "results" number an ads-manager UI shows per campaign,
//! plus a messaging-conversation count, from the upstream actions array. The
//! priority orders below are load-bearing compatibility rules: first match
//! wins and matches are never summed across tags.

use crate::graph::value::coerce_u64;
use crate::models::ActionRecord;

/// Purchase action types in priority order, highest first. Matched exactly:
/// the upstream reports one applicable purchase type per campaign, and
/// `omni_purchase` is the combined lowest-priority fallback.
pub const PURCHASE_PRIORITY: [&str; 5] = [
    "onsite_conversion.purchase",
    "purchase",
    "app_custom_event.fb_mobile_purchase",
    "offsite_conversion.fb_pixel_purchase",
    "omni_purchase",
];

/// Messaging action candidates in priority order. Matched by substring,
/// unlike the purchase scan; see the normalization notes in DESIGN.md.
const MESSAGING_CANDIDATES: [&str; 3] = [
    "onsite_conversion.messaging_conversation_started_7d",
    "onsite_conversion.total_messaging_connection",
    "onsite_conversion.messaging_first_reply",
];

/// The (results, messages) pair extracted from one actions array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcomes {
    pub results: u64,
    pub messages: u64,
}

/// Resolve results and messages from an actions array.
///
/// `conversions` is the top-level conversions count from the same insights
/// row, used as the final fallback when no action tag produced a result.
pub fn resolve_outcomes(actions: &[ActionRecord], objective: &str, conversions: u64) -> Outcomes {
    Outcomes {
        results: resolve_results(actions, objective, conversions),
        messages: resolve_messages(actions),
    }
}

fn action_value(record: &ActionRecord) -> u64 {
    coerce_u64(record.value.as_ref())
}

fn resolve_messages(actions: &[ActionRecord]) -> u64 {
    for candidate in MESSAGING_CANDIDATES {
        if let Some(record) = actions.iter().find(|a| a.action_type.contains(candidate)) {
            return action_value(record);
        }
    }
    0
}

fn resolve_results(actions: &[ActionRecord], objective: &str, conversions: u64) -> u64 {
    // Purchase scan applies to purchase-like objectives and as the general
    // default. Exact tag match only.
    let mut results = 0;
    for tag in PURCHASE_PRIORITY {
        if let Some(record) = actions.iter().find(|a| a.action_type == tag) {
            results = action_value(record);
            break;
        }
    }

    if results == 0 {
        let objective = objective.to_ascii_uppercase();
        if objective.contains("LEAD") {
            // lead tags vary ("lead", "leadgen_grouped", ...), so substring
            if let Some(record) = actions.iter().find(|a| a.action_type.contains("lead")) {
                results = action_value(record);
            }
        } else if objective.contains("TRAFFIC") || objective.contains("LINK_CLICK") {
            if let Some(record) = actions.iter().find(|a| a.action_type == "link_click") {
                results = action_value(record);
            }
        }
        // other objectives legitimately show zero results
    }

    if results == 0 && conversions > 0 {
        results = conversions;
    }

    results
}
