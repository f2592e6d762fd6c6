//! HTTP implementation of [`TaskBackend`] over the REST task API.

use dak_domain::config::BackendConfig;
use dak_domain::directory::OfficerDirectoryEntry;
use dak_domain::error::{Error, Result};
use dak_domain::task::TaskRecord;
use serde_json::Value;

use crate::traits::TaskBackend;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct HttpBackend {
    tasks_url: String,
    employees_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            employees_url: employees_url(&cfg.tasks_url),
            tasks_url: cfg.tasks_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn item_url(&self, id: u64) -> String {
        format!("{}/{}", self.tasks_url, id)
    }

    fn collection_url(&self) -> String {
        format!("{}/", self.tasks_url)
    }
}

/// Derive the employee directory URL from the tasks collection URL:
/// drop the trailing `tasks` segment, make sure the remainder ends in
/// `/api`, and append `/employees/`.
///
/// `http://localhost:8000/tasks/` → `http://localhost:8000/api/employees/`
/// `https://board.example/api/tasks/` → `https://board.example/api/employees/`
pub fn employees_url(tasks_url: &str) -> String {
    let trimmed = tasks_url.trim_end_matches('/');
    let parent = trimmed
        .rsplit_once('/')
        .map(|(head, _)| head)
        .unwrap_or(trimmed);
    if parent.ends_with("/api") {
        format!("{parent}/employees/")
    } else {
        format!("{parent}/api/employees/")
    }
}

async fn read_error_body(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Error::Backend { status, message }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl TaskBackend for HttpBackend {
    async fn create_task(&self, record: &TaskRecord) -> Result<TaskRecord> {
        let resp = self
            .client
            .post(self.collection_url())
            .json(record)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }
        let created: TaskRecord = resp
            .json()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(created)
    }

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        let resp = self
            .client
            .get(self.collection_url())
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }
        resp.json().await.map_err(|e| Error::Http(e.to_string()))
    }

    async fn get_task(&self, id: u64) -> Result<TaskRecord> {
        let resp = self
            .client
            .get(self.item_url(id))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }
        resp.json().await.map_err(|e| Error::Http(e.to_string()))
    }

    async fn update_task(&self, id: u64, fields: &Value) -> Result<()> {
        let resp = self
            .client
            .put(self.item_url(id))
            .json(fields)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }
        Ok(())
    }

    async fn delete_task(&self, id: u64) -> Result<()> {
        let resp = self
            .client
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }
        Ok(())
    }

    async fn list_employees(&self) -> Vec<OfficerDirectoryEntry> {
        let resp = match self.client.get(&self.employees_url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "employee directory fetch failed");
                return Vec::new();
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(status = resp.status().as_u16(), "employee directory fetch failed");
            return Vec::new();
        }
        match resp.json::<Vec<OfficerDirectoryEntry>>().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "employee directory parse failed");
                Vec::new()
            }
        }
    }
}
