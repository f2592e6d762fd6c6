//! Pipeline scenarios against a scripted model and an in-memory backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde_json::Value;

use dak_backend::TaskBackend;
use dak_bot::runtime::handle_inbound_at;
use dak_bot::state::AppState;
use dak_bot::storage::FileStorage;
use dak_bot::transport::{InboundMessage, InboundPayload, RepliedMessage, ReplyToken};
use dak_domain::config::Config;
use dak_domain::directory::OfficerDirectoryEntry;
use dak_domain::error::{Error, Result};
use dak_domain::task::TaskRecord;
use dak_providers::{LanguageModel, MediaAttachment};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Scripted collaborators
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn next(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Model("script exhausted".into()))
    }
}

#[async_trait::async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    async fn complete_with_media(&self, prompt: &str, _media: &MediaAttachment) -> Result<String> {
        self.next(prompt)
    }
}

#[derive(Default)]
struct MockBackend {
    employees: Vec<OfficerDirectoryEntry>,
    /// When true, every create is rejected with a uniqueness error.
    reject_creates: bool,
    created: Mutex<Vec<TaskRecord>>,
    attempted_titles: Mutex<Vec<String>>,
    updates: Mutex<Vec<(u64, Value)>>,
    deletes: Mutex<Vec<u64>>,
    /// Record served by `get_task`, if preset.
    stored: Mutex<Option<TaskRecord>>,
}

#[async_trait::async_trait]
impl TaskBackend for MockBackend {
    async fn create_task(&self, record: &TaskRecord) -> Result<TaskRecord> {
        self.attempted_titles
            .lock()
            .unwrap()
            .push(record.task_number.clone());
        if self.reject_creates {
            return Err(Error::Backend {
                status: 400,
                message: "task with this task number already exists".into(),
            });
        }
        let mut created = record.clone();
        created.id = Some(self.created.lock().unwrap().len() as u64 + 1);
        created.status = Some("Pending".into());
        self.created.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>> {
        Ok(self.created.lock().unwrap().clone())
    }

    async fn get_task(&self, id: u64) -> Result<TaskRecord> {
        if let Some(stored) = self.stored.lock().unwrap().clone() {
            return Ok(stored);
        }
        self.created
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or(Error::Backend {
                status: 404,
                message: "not found".into(),
            })
    }

    async fn update_task(&self, id: u64, fields: &Value) -> Result<()> {
        self.updates.lock().unwrap().push((id, fields.clone()));
        // Reflect the change in the stored record so the re-fetch sees it.
        let mut stored = self.stored.lock().unwrap();
        if let Some(record) = stored.as_mut() {
            if let Some(d) = fields.get("deadline_date").and_then(|v| v.as_str()) {
                record.deadline_date = d.to_string();
            }
            if let Some(t) = fields.get("time_given").and_then(|v| v.as_str()) {
                record.time_given = t.to_string();
            }
            if let Some(a) = fields.get("assigned_agency").and_then(|v| v.as_str()) {
                record.assigned_agency = Some(a.to_string());
            }
        }
        Ok(())
    }

    async fn delete_task(&self, id: u64) -> Result<()> {
        self.deletes.lock().unwrap().push(id);
        Ok(())
    }

    async fn list_employees(&self) -> Vec<OfficerDirectoryEntry> {
        self.employees.clone()
    }
}

struct NoStorage;

#[async_trait::async_trait]
impl FileStorage for NoStorage {
    async fn upload(&self, _bytes: &[u8], _name: &str, _mime: &str) -> Option<String> {
        None
    }
}

fn state_with(model: Arc<ScriptedModel>, backend: Arc<MockBackend>) -> AppState {
    let mut config = Config::default();
    config.policy.inter_task_pause_ms = 0;
    AppState {
        config,
        model,
        backend,
        storage: Arc::new(NoStorage),
    }
}

fn text(msg: &str) -> InboundMessage {
    InboundMessage {
        payload: InboundPayload::Text(msg.to_string()),
        reply_to: None,
    }
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn steno_directory() -> Vec<OfficerDirectoryEntry> {
    vec![OfficerDirectoryEntry {
        name: "Ramlal".into(),
        display_name: "Steno".into(),
        mobile: None,
    }]
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CREATE
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn create_scenario_pump_by_friday() {
    let model = Arc::new(ScriptedModel::new(&[r#"```json
{"intent": "CREATE", "tasks": [{
  "description": "Fix the pump",
  "assigned_agency": "Steno",
  "deadline_date": "2024-03-08",
  "priority": "Medium"
}]}
```"#]));
    let backend = Arc::new(MockBackend {
        employees: steno_directory(),
        ..Default::default()
    });
    let state = state_with(model.clone(), backend.clone());

    let out = handle_inbound_at(
        &state,
        text("Tell Steno to fix the pump by Friday"),
        monday(),
    )
    .await;

    let created = backend.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let record = &created[0];
    assert_eq!(record.task_number, "Fix the pump");
    assert_eq!(record.description, "");
    assert_eq!(record.assigned_agency.as_deref(), Some("Steno"));
    assert_eq!(record.allocated_date, "2024-03-04");
    assert_eq!(record.deadline_date, "2024-03-08");
    assert_eq!(record.time_given, "4");
    assert_eq!(record.source, "VoiceBot");

    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Task Created"));
    assert!(out[0].text.contains("Ref: #1"));
    assert_eq!(out[0].token, Some(ReplyToken { record_id: 1 }));

    // The directory was rendered into the extraction prompt.
    let prompts = model.prompts.lock().unwrap();
    assert!(prompts[0].contains("Ramlal -> Steno"));
}

#[tokio::test]
async fn create_batch_commits_in_extractor_order() {
    let model = Arc::new(ScriptedModel::new(&[r#"{"intent": "CREATE", "tasks": [
        {"description": "First survey"},
        {"description": ""},
        {"description": "Third survey"}
    ]}"#]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(&state, text("three jobs"), monday()).await;
    assert_eq!(out.len(), 3);

    let created = backend.created.lock().unwrap();
    assert_eq!(created[0].task_number, "First survey");
    // Empty description falls back to a positional placeholder.
    assert_eq!(created[1].task_number, "Task 2");
    assert_eq!(created[2].task_number, "Third survey");
    // Blank assignee resolves to the default identity.
    assert_eq!(created[0].assigned_agency.as_deref(), Some("Steno"));
    // No deadline spoken: allocated + 7.
    assert_eq!(created[0].deadline_date, "2024-03-11");
    assert_eq!(created[0].time_given, "7");
}

#[tokio::test]
async fn collision_retry_is_bounded_at_five_attempts() {
    let model = Arc::new(ScriptedModel::new(
        &[r#"{"intent": "CREATE", "tasks": [{"description": "Fix the pump"}]}"#],
    ));
    let backend = Arc::new(MockBackend {
        reject_creates: true,
        ..Default::default()
    });
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(&state, text("fix the pump"), monday()).await;

    let titles = backend.attempted_titles.lock().unwrap();
    assert_eq!(
        *titles,
        vec![
            "Fix the pump",
            "Fix the pump (2)",
            "Fix the pump (3)",
            "Fix the pump (4)",
            "Fix the pump (5)",
        ]
    );
    // Only the final failure is user-visible.
    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Failed to create task"));
}

#[tokio::test]
async fn extraction_error_abandons_whole_request() {
    let model = Arc::new(ScriptedModel::new(&["Sorry, I can't produce JSON today."]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(&state, text("do something"), monday()).await;

    assert!(backend.created.lock().unwrap().is_empty());
    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Something went wrong"));
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// QUERY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn query_answer_is_returned_verbatim() {
    let model = Arc::new(ScriptedModel::new(&[
        r#"{"intent": "QUERY", "search_query": "pending tasks for Steno"}"#,
        "Steno has 2 pending tasks.",
    ]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend);

    let out = handle_inbound_at(&state, text("ask what is pending for Steno"), monday()).await;

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].text, "Steno has 2 pending tasks.");
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Reply mutations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn reply_to(confirmation_text: &str, token: Option<ReplyToken>, reply: &str) -> InboundMessage {
    InboundMessage {
        payload: InboundPayload::Text(reply.to_string()),
        reply_to: Some(RepliedMessage {
            token,
            text: confirmation_text.to_string(),
        }),
    }
}

#[tokio::test]
async fn update_scenario_change_deadline() {
    let model = Arc::new(ScriptedModel::new(&[r#"```json
{"action": "UPDATE", "fields": {"deadline_date": "2024-03-11"}}
```"#]));
    let backend = Arc::new(MockBackend {
        stored: Mutex::new(Some(TaskRecord {
            id: Some(10),
            task_number: "Fix the pump".into(),
            assigned_agency: Some("Steno".into()),
            allocated_date: "2024-03-04".into(),
            deadline_date: "2024-03-08".into(),
            time_given: "4".into(),
            source: "VoiceBot".into(),
            ..Default::default()
        })),
        ..Default::default()
    });
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(
        &state,
        reply_to("🔖 Ref: #10", None, "change deadline to next Monday"),
        monday(),
    )
    .await;

    let updates = backend.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    let (id, fields) = &updates[0];
    assert_eq!(*id, 10);
    assert_eq!(fields["deadline_date"], "2024-03-11");
    // time_given re-derived from the stored allocation date.
    assert_eq!(fields["time_given"], "7");

    // The echo reflects the re-fetched record.
    assert_eq!(out.len(), 1);
    assert!(out[0].text.contains("Task Updated"));
    assert!(out[0].text.contains("2024-03-11"));
}

#[tokio::test]
async fn update_normalizes_assignee_through_directory() {
    let model = Arc::new(ScriptedModel::new(
        &[r#"{"action": "UPDATE", "fields": {"assigned_agency": "ramlal"}}"#],
    ));
    let backend = Arc::new(MockBackend {
        employees: steno_directory(),
        stored: Mutex::new(Some(TaskRecord {
            id: Some(4),
            task_number: "Survey".into(),
            allocated_date: "2024-03-04".into(),
            deadline_date: "2024-03-11".into(),
            time_given: "7".into(),
            ..Default::default()
        })),
        ..Default::default()
    });
    let state = state_with(model, backend.clone());

    handle_inbound_at(
        &state,
        reply_to("Ref: #4", None, "give it to ramlal"),
        monday(),
    )
    .await;

    let updates = backend.updates.lock().unwrap();
    assert_eq!(updates[0].1["assigned_agency"], "Steno");
}

#[tokio::test]
async fn delete_scenario() {
    let model = Arc::new(ScriptedModel::new(&[r#"{"action": "DELETE"}"#]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(
        &state,
        reply_to(
            "irrelevant",
            Some(ReplyToken { record_id: 482 }),
            "delete this",
        ),
        monday(),
    )
    .await;

    assert_eq!(*backend.deletes.lock().unwrap(), vec![482]);
    assert!(out[0].text.contains("deleted"));
}

#[tokio::test]
async fn reply_without_reference_is_terminal() {
    // No model response scripted: the resolver must bail before any
    // model or backend contact.
    let model = Arc::new(ScriptedModel::new(&[]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(
        &state,
        reply_to("Task Created! (no marker)", None, "delete this"),
        monday(),
    )
    .await;

    assert!(out[0].text.contains("Cannot modify"));
    assert!(backend.deletes.lock().unwrap().is_empty());
    assert!(backend.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unrecognized_modification_touches_nothing() {
    let model = Arc::new(ScriptedModel::new(&[r#"{"action": "ESCALATE"}"#]));
    let backend = Arc::new(MockBackend::default());
    let state = state_with(model, backend.clone());

    let out = handle_inbound_at(
        &state,
        reply_to("Ref: #3", None, "what a nice task"),
        monday(),
    )
    .await;

    assert!(out[0].text.contains("could not recognize"));
    assert!(backend.deletes.lock().unwrap().is_empty());
    assert!(backend.updates.lock().unwrap().is_empty());
}
