use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TaskRecord — the unit of work
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A task record as the backend stores it.
///
/// Field names follow the backend's snake_case wire format. `id` and
/// `status` are assigned server-side and only present on records that
/// came back from a create or fetch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TaskRecord {
    /// Human-readable identifier/title. Unique per the backend's
    /// constraint; derived from the description, with a numbered suffix
    /// appended on collision.
    pub task_number: String,
    /// Free-text body. Usually blank: the description is promoted into
    /// `task_number` and the body cleared (a product convention, see
    /// `PolicyConfig::promote_description`).
    #[serde(default)]
    pub description: String,
    /// Canonical display name of the responsible party.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agency: Option<String>,
    /// Creation date, local clock, `YYYY-MM-DD`.
    pub allocated_date: String,
    /// Deadline, `YYYY-MM-DD`. Never absent on a persisted record.
    pub deadline_date: String,
    /// Day-count `deadline_date - allocated_date`, stringified.
    pub time_given: String,
    #[serde(default)]
    pub priority: Priority,
    /// Constant tag identifying the origin channel.
    pub source: String,
    /// Externally-hosted attachment URL, when an upload succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_data: Option<String>,
    /// Batch-scoped deterministic key so a compliant backend can
    /// upsert-or-reject instead of relying on title probing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,

    // Backend-assigned, opaque to the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Priority
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lenient parse for model output. Anything unrecognized (including
    /// null rendered as an empty string) is Medium.
    pub fn from_model(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("high") => Priority::High,
            Some(s) if s.eq_ignore_ascii_case("low") => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        };
        f.write_str(s)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Title derivation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Derive the task title from the extracted description. Falls back to a
/// positional placeholder only when the description itself is empty.
pub fn derive_task_number(description: &str, position: usize) -> String {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        format!("Task {}", position + 1)
    } else {
        trimmed.to_string()
    }
}

/// Retitle a record for collision attempt `attempt` (1-based). Attempt 1
/// keeps the base title; attempt k > 1 appends `" (k)"`.
pub fn titled_for_attempt(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base} ({attempt})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_is_lenient() {
        assert_eq!(Priority::from_model(Some("HIGH")), Priority::High);
        assert_eq!(Priority::from_model(Some("low ")), Priority::Low);
        assert_eq!(Priority::from_model(Some("urgentish")), Priority::Medium);
        assert_eq!(Priority::from_model(None), Priority::Medium);
    }

    #[test]
    fn task_number_falls_back_to_placeholder() {
        assert_eq!(derive_task_number("Fix the pump", 0), "Fix the pump");
        assert_eq!(derive_task_number("   ", 2), "Task 3");
    }

    #[test]
    fn collision_suffixes() {
        assert_eq!(titled_for_attempt("Fix the pump", 1), "Fix the pump");
        assert_eq!(titled_for_attempt("Fix the pump", 2), "Fix the pump (2)");
        assert_eq!(titled_for_attempt("Fix the pump", 5), "Fix the pump (5)");
    }

    #[test]
    fn record_serializes_without_server_fields() {
        let record = TaskRecord {
            task_number: "Fix the pump".into(),
            allocated_date: "2024-03-04".into(),
            deadline_date: "2024-03-08".into(),
            time_given: "4".into(),
            source: "VoiceBot".into(),
            ..Default::default()
        };
        let v = serde_json::to_value(&record).unwrap();
        assert!(v.get("id").is_none());
        assert!(v.get("status").is_none());
        assert_eq!(v["priority"], "Medium");
    }
}
