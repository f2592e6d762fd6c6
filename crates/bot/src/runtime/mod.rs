//! Per-message pipeline dispatch.
//!
//! One inbound message runs as one sequential chain: directory refresh,
//! extraction, then either the commit loop or the query responder. A
//! reply to a bot confirmation skips extraction entirely and goes to the
//! mutation resolver. Failures never cross messages; each chain renders
//! its own short error message and ends.

pub mod commit;
pub mod extract;
pub mod mutate;
pub mod query;

use chrono::NaiveDate;
use dak_domain::directory;

use crate::state::AppState;
use crate::transport::{InboundMessage, InboundPayload, OutboundMessage};

use extract::ExtractionOutcome;

/// Handle one inbound message with the bot's local clock.
pub async fn handle_inbound(state: &AppState, inbound: InboundMessage) -> Vec<OutboundMessage> {
    let today = chrono::Local::now().date_naive();
    handle_inbound_at(state, inbound, today).await
}

/// Same as [`handle_inbound`] with an injected "today" so the chain is
/// deterministic under test.
pub async fn handle_inbound_at(
    state: &AppState,
    inbound: InboundMessage,
    today: NaiveDate,
) -> Vec<OutboundMessage> {
    // Replies to our own messages are mutations, not new commands.
    if let Some(replied) = &inbound.reply_to {
        let reply_text = match &inbound.payload {
            InboundPayload::Text(text) => text.clone(),
            InboundPayload::Media(_) => String::new(),
        };
        return vec![mutate::resolve(state, replied, &reply_text).await];
    }

    // Directory is refetched per invocation, not cached across requests.
    let entries = state.backend.list_employees().await;
    let roster = directory::prompt_roster(&entries);

    let (outcome, attachment) = match &inbound.payload {
        InboundPayload::Text(text) => {
            (extract::extract_text(state, today, &roster, text).await, None)
        }
        InboundPayload::Media(media) => {
            // Upload failure degrades to "no attachment", never an abort.
            let link = state
                .storage
                .upload(&media.bytes, &media.display_name, &media.mime_type)
                .await;
            (
                extract::extract_media(state, today, &roster, media).await,
                link,
            )
        }
    };

    match outcome {
        Ok(ExtractionOutcome::Create(tasks)) => {
            commit::commit_batch(state, &entries, tasks, today, attachment).await
        }
        Ok(ExtractionOutcome::Query(question)) => match query::answer(state, &question).await {
            Ok(msg) => vec![msg],
            Err(e) => {
                tracing::error!(error = %e, "query path failed");
                vec![OutboundMessage::plain(format!("❌ Could not answer that: {e}"))]
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "extraction failed, request abandoned");
            vec![OutboundMessage::plain(format!(
                "❌ Something went wrong while reading that command: {e}"
            ))]
        }
    }
}
