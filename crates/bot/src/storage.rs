//! Attachment storage interface. The real uploader (a cloud drive with
//! public view links) is an external collaborator; by contract a failed
//! upload degrades to "task created without attachment", never an abort.

/// Stores a media file somewhere public and returns a view link.
#[async_trait::async_trait]
pub trait FileStorage: Send + Sync {
    /// `None` signals upload failure; callers proceed without an
    /// attachment.
    async fn upload(&self, bytes: &[u8], display_name: &str, mime_type: &str) -> Option<String>;
}

/// Default storage when no uploader is configured.
pub struct DisabledStorage;

#[async_trait::async_trait]
impl FileStorage for DisabledStorage {
    async fn upload(&self, _bytes: &[u8], display_name: &str, _mime_type: &str) -> Option<String> {
        tracing::debug!(display_name, "file storage disabled, skipping upload");
        None
    }
}
