//! Query responder: answer a question about existing records from a
//! bounded slice of the backend's task list. This path is deliberately
//! lower-assurance than CREATE: the model answer goes back verbatim.

use dak_domain::error::Result;
use dak_domain::task::TaskRecord;
use serde_json::Value;

use crate::state::AppState;
use crate::transport::OutboundMessage;

/// Project records to the four fields the model needs, keeping only the
/// most recent `limit`. The bound is cost/latency control, not
/// correctness.
fn bounded_context(records: &[TaskRecord], limit: usize) -> Vec<Value> {
    let start = records.len().saturating_sub(limit);
    records[start..]
        .iter()
        .map(|r| {
            serde_json::json!({
                "task": r.task_number,
                "assigned": r.assigned_agency,
                "status": r.status,
                "deadline": r.deadline_date,
            })
        })
        .collect()
}

pub async fn answer(state: &AppState, question: &str) -> Result<OutboundMessage> {
    let records = state.backend.list_tasks().await?;
    let context = bounded_context(&records, state.config.policy.query_context_limit);

    let prompt = format!(
        "You are a task-board assistant. Answer the question using ONLY\n\
         the task context below. If the context does not contain the\n\
         answer, say so plainly.\n\
         \n\
         TASK CONTEXT:\n{}\n\
         \n\
         QUESTION: {}",
        serde_json::to_string_pretty(&context)?,
        question,
    );

    let reply = state.model.complete(&prompt).await?;
    Ok(OutboundMessage::plain(reply.trim().to_string()))
}
