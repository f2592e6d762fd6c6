use dak_domain::directory::OfficerDirectoryEntry;
use dak_domain::error::Result;
use dak_domain::task::TaskRecord;
use serde_json::Value;

/// Persistence operations the pipeline needs from the task store.
///
/// Every call is an independent network round trip; there is no session
/// or transaction spanning calls.
#[async_trait::async_trait]
pub trait TaskBackend: Send + Sync {
    /// `POST /tasks/`. The returned record carries the backend-assigned
    /// `id` and `status`.
    async fn create_task(&self, record: &TaskRecord) -> Result<TaskRecord>;

    /// `GET /tasks/`, the full collection.
    async fn list_tasks(&self) -> Result<Vec<TaskRecord>>;

    /// `GET /tasks/{id}`.
    async fn get_task(&self, id: u64) -> Result<TaskRecord>;

    /// `PUT /tasks/{id}` with a partial body; only the supplied fields
    /// change.
    async fn update_task(&self, id: u64, fields: &Value) -> Result<()>;

    /// `DELETE /tasks/{id}`.
    async fn delete_task(&self, id: u64) -> Result<()>;

    /// `GET .../api/employees/`. Infallible by contract: any network or
    /// parse failure logs a warning and yields an empty directory.
    async fn list_employees(&self) -> Vec<OfficerDirectoryEntry>;
}
