//! Reply mutation resolver: a reply to one of our own confirmations is
//! an edit or delete request against the record that confirmation
//! announced.
//!
//! Single transition, no retry: reference recovery, one classification
//! round trip, then the backend call. A failed mutation needs a fresh
//! user reply.

use std::sync::OnceLock;

use dak_domain::deadline;
use dak_domain::directory;
use dak_domain::error::{Error, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::runtime::extract::strip_fences;
use crate::state::AppState;
use crate::transport::{OutboundMessage, RepliedMessage};

/// Fields a reply is allowed to change.
const MUTABLE_FIELDS: [&str; 4] = [
    "task_number",
    "assigned_agency",
    "deadline_date",
    "description",
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reference recovery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn ref_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Ref:\s*#(\d+)").unwrap())
}

/// Recover the record id from the replied-to confirmation. The structured
/// token wins; the visible `Ref: #N` marker is the fallback for clients
/// that stripped our metadata. No marker at all is terminal.
pub fn resolve_reference(replied: &RepliedMessage) -> Result<u64> {
    if let Some(token) = replied.token {
        return Ok(token.record_id);
    }
    ref_marker()
        .captures(&replied.text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::Reference("no reference id in replied message".into()))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Classification
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
enum MutationAction {
    Delete,
    Update(Map<String, Value>),
    Unrecognized,
}

fn classification_prompt(reply_text: &str, record_id: u64) -> String {
    format!(
        "A user replied to the confirmation of task #{record_id} with:\n\
         \"{reply_text}\"\n\
         \n\
         Decide what they want. Return ONLY a JSON object:\n\
         - action: \"DELETE\" if they want the task removed, \"UPDATE\" if\n\
           they want it changed, anything else if unclear.\n\
         - For UPDATE, fields: an object containing only the changed\n\
           fields, restricted to task_number, assigned_agency,\n\
           deadline_date (YYYY-MM-DD), description.\n"
    )
}

fn parse_classification(raw: &str) -> Result<MutationAction> {
    let body: Value = serde_json::from_str(strip_fences(raw))
        .map_err(|e| Error::Extraction(format!("model returned non-JSON output: {e}")))?;

    let action = body.get("action").and_then(|v| v.as_str()).unwrap_or("");
    if action.eq_ignore_ascii_case("delete") {
        return Ok(MutationAction::Delete);
    }
    if action.eq_ignore_ascii_case("update") {
        let mut fields = Map::new();
        if let Some(raw_fields) = body.get("fields").and_then(|f| f.as_object()) {
            for key in MUTABLE_FIELDS {
                if let Some(v) = raw_fields.get(key) {
                    if !v.is_null() {
                        fields.insert(key.to_string(), v.clone());
                    }
                }
            }
        }
        if !fields.is_empty() {
            return Ok(MutationAction::Update(fields));
        }
    }
    Ok(MutationAction::Unrecognized)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Apply
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn apply_update(
    state: &AppState,
    record_id: u64,
    mut fields: Map<String, Value>,
) -> OutboundMessage {
    // Normalize the assignee with the live directory, the same backstop
    // the create path uses.
    if let Some(candidate) = fields.get("assigned_agency").and_then(|v| v.as_str()) {
        let entries = state.backend.list_employees().await;
        let normalized = directory::normalize_to_display_name(
            &entries,
            Some(candidate),
            &state.config.policy.default_assignee,
        );
        fields.insert("assigned_agency".into(), Value::String(normalized));
    }

    // A deadline change re-derives time_given against the record's
    // stored allocation date.
    if let Some(new_deadline) = fields.get("deadline_date").and_then(|v| v.as_str()) {
        let time_given = match state.backend.get_task(record_id).await {
            Ok(current) => deadline::recompute_time_given(&current.allocated_date, new_deadline),
            Err(e) => {
                tracing::warn!(record_id, error = %e, "pre-update fetch failed");
                deadline::FALLBACK_HORIZON_DAYS.to_string()
            }
        };
        fields.insert("time_given".into(), Value::String(time_given));
    }

    if let Err(e) = state.backend.update_task(record_id, &Value::Object(fields)).await {
        return OutboundMessage::plain(format!("⚠️ Update failed for task #{record_id}: {e}"));
    }

    // Re-fetch so the echo reflects backend-side derived fields.
    match state.backend.get_task(record_id).await {
        Ok(updated) => OutboundMessage::plain(format!(
            "✏️ Task Updated!\n\n\
             📝 Task: {}\n\
             👤 Assigned: {}\n\
             📅 Deadline: {}\n\
             🔖 Ref: #{}",
            updated.task_number,
            updated.assigned_agency.as_deref().unwrap_or("Unassigned"),
            updated.deadline_date,
            record_id,
        )),
        Err(e) => {
            tracing::warn!(record_id, error = %e, "post-update fetch failed");
            OutboundMessage::plain(format!("✏️ Task #{record_id} updated."))
        }
    }
}

/// Entry point: classify the reply and dispatch the mutation.
pub async fn resolve(
    state: &AppState,
    replied: &RepliedMessage,
    reply_text: &str,
) -> OutboundMessage {
    let record_id = match resolve_reference(replied) {
        Ok(id) => id,
        Err(e) => {
            tracing::info!(error = %e, "mutation reply without reference");
            return OutboundMessage::plain(
                "⚠️ Cannot modify: that message has no reference id.",
            );
        }
    };

    let raw = match state
        .model
        .complete(&classification_prompt(reply_text, record_id))
        .await
    {
        Ok(raw) => raw,
        Err(e) => return OutboundMessage::plain(format!("⚠️ Could not understand the reply: {e}")),
    };

    let action = match parse_classification(&raw) {
        Ok(action) => action,
        Err(e) => return OutboundMessage::plain(format!("⚠️ Could not understand the reply: {e}")),
    };

    match action {
        MutationAction::Delete => match state.backend.delete_task(record_id).await {
            Ok(()) => OutboundMessage::plain(format!("🗑️ Task #{record_id} deleted.")),
            Err(e) => {
                OutboundMessage::plain(format!("⚠️ Delete failed for task #{record_id}: {e}"))
            }
        },
        MutationAction::Update(fields) => apply_update(state, record_id, fields).await,
        MutationAction::Unrecognized => OutboundMessage::plain(
            "🤔 I could not recognize that modification. Reply with an edit or a delete request.",
        ),
    }
}
