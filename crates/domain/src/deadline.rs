//! Deadline resolution: one pure function, deterministic in its inputs.

use chrono::{Days, NaiveDate};

/// Days granted when the deadline is absent or unparseable.
pub const FALLBACK_HORIZON_DAYS: u64 = 7;

/// A resolved deadline plus the stringified day-count the backend stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deadline {
    pub date: NaiveDate,
    /// `deadline - allocated` in days, as the backend's string field.
    pub time_given: String,
}

/// Convert an optional ISO date from the extractor into a concrete
/// deadline. A present, valid `raw` yields its exact date and the day
/// delta from `allocated`; anything else falls back to the fixed 7-day
/// horizon. Never fails.
pub fn resolve(allocated: NaiveDate, raw: Option<&str>) -> Deadline {
    if let Some(raw) = raw {
        if let Ok(date) = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            let delta = (date - allocated).num_days();
            return Deadline {
                date,
                time_given: delta.to_string(),
            };
        }
        tracing::warn!(raw, "unparseable deadline, using fallback horizon");
    }
    let date = allocated
        .checked_add_days(Days::new(FALLBACK_HORIZON_DAYS))
        .unwrap_or(allocated);
    Deadline {
        date,
        time_given: FALLBACK_HORIZON_DAYS.to_string(),
    }
}

/// Recompute the day-count after a deadline edit. Used by the mutation
/// path, where the allocated date arrives as the backend's stored string;
/// any parse failure falls back to "7" rather than erroring.
pub fn recompute_time_given(allocated: &str, deadline: &str) -> String {
    let a = NaiveDate::parse_from_str(allocated.trim(), "%Y-%m-%d");
    let d = NaiveDate::parse_from_str(deadline.trim(), "%Y-%m-%d");
    match (a, d) {
        (Ok(a), Ok(d)) => (d - a).num_days().to_string(),
        _ => FALLBACK_HORIZON_DAYS.to_string(),
    }
}
