//! Chat-transport interface types. The transport layer itself (message
//! delivery, file download, inline buttons) lives outside this crate;
//! these are the shapes it hands us and gets back.

use dak_providers::MediaAttachment;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reply correlation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Opaque handle a transport attaches to an outbound confirmation so a
/// later reply can be correlated with the record it created, without
/// re-parsing rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyToken {
    pub record_id: u64,
}

/// The bot-authored message a user replied to. `token` survives when the
/// transport round-trips our metadata; `text` is always available and
/// serves as the scrape fallback.
#[derive(Debug, Clone)]
pub struct RepliedMessage {
    pub token: Option<ReplyToken>,
    pub text: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Messages
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Text(String),
    /// A downloaded voice note, image, or document.
    Media(MediaAttachment),
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub payload: InboundPayload,
    /// Present when the user replied to one of our own messages.
    pub reply_to: Option<RepliedMessage>,
}

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub text: String,
    /// Set on confirmations that reference a created record.
    pub token: Option<ReplyToken>,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            token: None,
        }
    }
}

/// Greeting shown on a `/start`-style command.
pub fn help_text() -> &'static str {
    "🎙️ Voice-to-Action Bot Active\n\n\
     Send a voice note or a text like:\n\
     'Assign road repair in Geedam to PWD by next Friday.'\n\n\
     I will create the task on your dashboard. Reply to any\n\
     confirmation to edit or delete that task, or start a message\n\
     with 'ask' to query existing tasks."
}
