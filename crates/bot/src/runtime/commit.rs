//! Task commit engine: assembles final records, resolves title
//! collisions via bounded retry, and persists each task of a batch in
//! extractor order.

use chrono::NaiveDate;
use dak_domain::deadline;
use dak_domain::directory::{self, OfficerDirectoryEntry};
use dak_domain::task::{self, Priority, TaskRecord};
use uuid::Uuid;

use crate::runtime::extract::ExtractedTask;
use crate::state::AppState;
use crate::transport::{OutboundMessage, ReplyToken};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record assembly
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the record for one extracted task: normalize the assignee,
/// resolve the deadline, stamp source and allocation date, and promote
/// the description into the title per policy.
pub fn assemble_record(
    state: &AppState,
    entries: &[OfficerDirectoryEntry],
    extracted: &ExtractedTask,
    position: usize,
    today: NaiveDate,
    batch_key: &str,
    attachment: Option<&str>,
) -> TaskRecord {
    let policy = &state.config.policy;

    let assignee = directory::normalize_to_display_name(
        entries,
        extracted.assigned_agency.as_deref(),
        &policy.default_assignee,
    );
    let resolved = deadline::resolve(today, extracted.deadline_date.as_deref());

    let description = extracted.description.as_deref().unwrap_or("");
    let task_number = task::derive_task_number(description, position);
    let body = if policy.promote_description {
        String::new()
    } else {
        description.trim().to_string()
    };

    TaskRecord {
        task_number,
        description: body,
        assigned_agency: Some(assignee),
        allocated_date: today.format("%Y-%m-%d").to_string(),
        deadline_date: resolved.date.format("%Y-%m-%d").to_string(),
        time_given: resolved.time_given,
        priority: Priority::from_model(extracted.priority.as_deref()),
        source: policy.source_tag.clone(),
        attachment_data: attachment.map(str::to_string),
        idempotency_key: Some(format!("{batch_key}-{position}")),
        id: None,
        status: None,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Bounded collision retry
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Persist one record, retrying up to the configured attempt bound.
/// Attempt k > 1 retitles with a `" (k)"` suffix, because the backend
/// enforces uniqueness on `task_number` and repeated commands produce
/// identical titles. Only the final attempt's failure reaches the user.
async fn persist_with_retry(state: &AppState, mut record: TaskRecord) -> OutboundMessage {
    let max_attempts = state.config.policy.max_create_attempts.max(1);
    let base_title = record.task_number.clone();

    let mut attempt = 1;
    loop {
        record.task_number = task::titled_for_attempt(&base_title, attempt);
        match state.backend.create_task(&record).await {
            Ok(created) => {
                notify_assignee(&created);
                return confirmation(&record, &created);
            }
            Err(e) if attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    title = %record.task_number,
                    error = %e,
                    "create rejected, retrying with suffix"
                );
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(title = %record.task_number, error = %e, "create failed");
                return OutboundMessage::plain(format!(
                    "⚠️ Failed to create task via API.\n{e}"
                ));
            }
        }
    }
}

/// Notification fan-out is simulated; real delivery is out of scope.
fn notify_assignee(created: &TaskRecord) {
    tracing::info!(
        assignee = created.assigned_agency.as_deref().unwrap_or("Unassigned"),
        id = created.id,
        "notification skipped (simulation)"
    );
}

fn confirmation(sent: &TaskRecord, created: &TaskRecord) -> OutboundMessage {
    let assigned = created
        .assigned_agency
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or("Unassigned");
    let deadline = if created.deadline_date.is_empty() {
        "No Deadline"
    } else {
        &created.deadline_date
    };
    let id = created.id.unwrap_or_default();
    let text = format!(
        "✅ Task Created!\n\n\
         📝 Task: {}\n\
         👤 Assigned: {}\n\
         📅 Deadline: {}\n\
         🔖 Ref: #{}",
        sent.task_number, assigned, deadline, id
    );
    OutboundMessage {
        text,
        token: created.id.map(|record_id| ReplyToken { record_id }),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Batch loop
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Commit every extracted task, strictly in extractor order, pausing
/// briefly between tasks so confirmations arrive in visible order. The
/// pause is presentation, not correctness.
pub async fn commit_batch(
    state: &AppState,
    entries: &[OfficerDirectoryEntry],
    tasks: Vec<ExtractedTask>,
    today: NaiveDate,
    attachment: Option<String>,
) -> Vec<OutboundMessage> {
    if tasks.is_empty() {
        return vec![OutboundMessage::plain(
            "🤔 I could not find any task in that message.",
        )];
    }

    let batch_key = Uuid::new_v4().to_string();
    let pause = std::time::Duration::from_millis(state.config.policy.inter_task_pause_ms);
    let count = tasks.len();

    let mut out = Vec::with_capacity(count);
    for (position, extracted) in tasks.into_iter().enumerate() {
        let record = assemble_record(
            state,
            entries,
            &extracted,
            position,
            today,
            &batch_key,
            attachment.as_deref(),
        );
        out.push(persist_with_retry(state, record).await);

        if position + 1 < count && !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }
    out
}
