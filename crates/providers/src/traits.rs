use dak_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A media file sent alongside a prompt: a voice note, an image, or a
/// document. Bytes are attached inline; the adapter handles encoding.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub bytes: Vec<u8>,
    /// e.g. `audio/ogg` for chat voice notes, `application/pdf`.
    pub mime_type: String,
    /// Original filename, used for storage display only.
    pub display_name: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core model trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A one-shot text-in/text-out language model.
///
/// Responses are returned verbatim: fenced-code unwrapping and JSON
/// parsing are the caller's responsibility, since only the extraction
/// client knows what shape it asked for.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send a text prompt and wait for the full response.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Send a prompt plus one media file (multimodal input).
    async fn complete_with_media(
        &self,
        prompt: &str,
        media: &MediaAttachment,
    ) -> Result<String>;
}
