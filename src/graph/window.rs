//! Time-window resolution for insights queries
//!
//! Named presets like "yesterday" are interpreted by the Graph API relative
//! to the target ad account's own timezone, which the dashboard does not know
//! up front. When a preset is translated to concrete dates here, the window is
//! computed in a configured reference timezone and then widened by one
//! calendar day on each side so it stays a superset of the intended period
//! whatever the account's actual offset is.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

/// Legacy deployments assumed UTC+7; kept as the default offset.
pub const DEFAULT_REFERENCE_OFFSET_HOURS: i32 = 7;

/// A resolved time window: either concrete calendar-date boundaries to send
/// as a `time_range`, or a preset name passed through to the upstream API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TimeWindow {
    Preset(String),
    Range { since: String, until: String },
}

impl TimeWindow {
    /// The query parameter this window contributes to an insights call.
    pub fn query_param(&self) -> (&'static str, String) {
        match self {
            TimeWindow::Preset(name) => ("date_preset", name.clone()),
            TimeWindow::Range { since, until } => (
                "time_range",
                serde_json::json!({ "since": since, "until": until }).to_string(),
            ),
        }
    }
}

/// Translates named date presets into concrete windows.
#[derive(Debug, Clone)]
pub struct WindowResolver {
    offset: FixedOffset,
}

impl WindowResolver {
    /// Build a resolver for the given reference UTC offset in hours.
    /// Out-of-range offsets fall back to the UTC+7 legacy default.
    pub fn new(offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| {
            tracing::warn!(
                "reference offset {offset_hours}h is out of range, falling back to UTC+{DEFAULT_REFERENCE_OFFSET_HOURS}"
            );
            FixedOffset::east_opt(DEFAULT_REFERENCE_OFFSET_HOURS * 3600)
                .expect("legacy UTC+7 offset is valid")
        });
        Self { offset }
    }

    /// Resolve a preset against the current clock.
    pub fn resolve(&self, preset: &str, translate: bool) -> TimeWindow {
        self.resolve_at(preset, translate, Utc::now())
    }

    /// Resolve a preset at an explicit instant.
    ///
    /// Returns `TimeWindow::Preset` untouched when translation is disabled or
    /// the preset is not day-granular (e.g. "maximum", "lifetime"); the
    /// upstream API handles those natively.
    pub fn resolve_at(&self, preset: &str, translate: bool, now: DateTime<Utc>) -> TimeWindow {
        if !translate {
            return TimeWindow::Preset(preset.to_string());
        }

        let today = now.with_timezone(&self.offset).date_naive();
        let yesterday = today - Duration::days(1);

        let (since, until) = match preset {
            "today" => (today, today),
            "yesterday" => (yesterday, yesterday),
            "last_7d" => (today - Duration::days(7), yesterday),
            "last_14d" => (today - Duration::days(14), yesterday),
            "last_28d" => (today - Duration::days(28), yesterday),
            "last_30d" => (today - Duration::days(30), yesterday),
            "this_month" => (first_of_month(today), today),
            "last_month" => previous_month_bounds(today),
            _ => return TimeWindow::Preset(preset.to_string()),
        };

        // Widen by one day on each side: the upstream resolves these dates in
        // the account's own timezone, which may differ from the reference.
        TimeWindow::Range {
            since: format_date(since - Duration::days(1)),
            until: format_date(until + Duration::days(1)),
        }
    }
}

impl Default for WindowResolver {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_OFFSET_HOURS)
    }
}

fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1).unwrap_or(d)
}

fn previous_month_bounds(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let last_of_previous = first_of_month(d) - Duration::days(1);
    (first_of_month(last_of_previous), last_of_previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    // 10:00 in UTC+7 on 2024-03-15
    fn reference_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 3, 0, 0).unwrap()
    }

    #[test]
    fn yesterday_is_widened_one_day_each_side() {
        let resolver = WindowResolver::new(7);
        let window = resolver.resolve_at("yesterday", true, reference_now());

        // naive boundary is 2024-03-14 on both ends
        assert_eq!(
            window,
            TimeWindow::Range {
                since: "2024-03-13".to_string(),
                until: "2024-03-15".to_string(),
            }
        );
    }

    #[test]
    fn last_7d_brackets_the_seven_days_ending_yesterday() {
        let resolver = WindowResolver::new(7);
        let window = resolver.resolve_at("last_7d", true, reference_now());

        assert_eq!(
            window,
            TimeWindow::Range {
                since: "2024-03-07".to_string(),
                until: "2024-03-15".to_string(),
            }
        );
    }

    #[test]
    fn month_presets_use_calendar_boundaries() {
        let resolver = WindowResolver::new(7);

        assert_eq!(
            resolver.resolve_at("this_month", true, reference_now()),
            TimeWindow::Range {
                since: "2024-02-29".to_string(),
                until: "2024-03-16".to_string(),
            }
        );
        assert_eq!(
            resolver.resolve_at("last_month", true, reference_now()),
            TimeWindow::Range {
                since: "2024-01-31".to_string(),
                until: "2024-03-01".to_string(),
            }
        );
    }

    #[test]
    fn reference_offset_can_shift_the_local_date() {
        // 23:30 UTC on 2024-03-14 is already 2024-03-15 in UTC+7
        let late = Utc.with_ymd_and_hms(2024, 3, 14, 23, 30, 0).unwrap();
        let resolver = WindowResolver::new(7);

        assert_eq!(
            resolver.resolve_at("today", true, late),
            TimeWindow::Range {
                since: "2024-03-14".to_string(),
                until: "2024-03-16".to_string(),
            }
        );

        // while a UTC reference still sees 2024-03-14
        let utc_resolver = WindowResolver::new(0);
        assert_eq!(
            utc_resolver.resolve_at("today", true, late),
            TimeWindow::Range {
                since: "2024-03-13".to_string(),
                until: "2024-03-15".to_string(),
            }
        );
    }

    #[test]
    fn non_day_granular_presets_pass_through() {
        let resolver = WindowResolver::default();

        assert_eq!(
            resolver.resolve_at("maximum", true, reference_now()),
            TimeWindow::Preset("maximum".to_string())
        );
        assert_eq!(
            resolver.resolve_at("lifetime", true, reference_now()),
            TimeWindow::Preset("lifetime".to_string())
        );
    }

    #[test]
    fn translation_can_be_disabled_entirely() {
        let resolver = WindowResolver::default();
        assert_eq!(
            resolver.resolve_at("yesterday", false, reference_now()),
            TimeWindow::Preset("yesterday".to_string())
        );
    }

    #[test]
    fn range_window_serializes_as_time_range_param() {
        let window = TimeWindow::Range {
            since: "2024-03-13".to_string(),
            until: "2024-03-15".to_string(),
        };
        let (key, value) = window.query_param();
        assert_eq!(key, "time_range");
        assert_eq!(value, r#"{"since":"2024-03-13","until":"2024-03-15"}"#);

        let preset = TimeWindow::Preset("last_7d".to_string());
        assert_eq!(preset.query_param(), ("date_preset", "last_7d".to_string()));
    }
}
