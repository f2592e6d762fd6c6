use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide configuration. Loaded once from an optional
/// `dakline.toml` plus the environment, then passed explicitly to each
/// stage (no ambient globals).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Language model
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "d_gemini_base")]
    pub base_url: String,
    #[serde(default = "d_gemini_model")]
    pub model: String,
    /// Environment variable holding the API key. The key itself never
    /// lives in the config file.
    #[serde(default = "d_gemini_key_env")]
    pub api_key_env: String,
    #[serde(default = "d_120000u")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: d_gemini_base(),
            model: d_gemini_model(),
            api_key_env: d_gemini_key_env(),
            timeout_ms: d_120000u(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Task backend
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Tasks collection URL. `API_URL` in the environment overrides it.
    /// The employee directory URL is derived from this one.
    #[serde(default = "d_tasks_url")]
    pub tasks_url: String,
    #[serde(default = "d_30000u")]
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            tasks_url: d_tasks_url(),
            timeout_ms: d_30000u(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Environment variable holding the bot token used by a real chat
    /// transport. The bundled REPL transport does not need it.
    #[serde(default = "d_bot_token_env")]
    pub token_env: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            token_env: d_bot_token_env(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Pipeline policy
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Identity a task falls back to when no assignee was spoken.
    #[serde(default = "d_default_assignee")]
    pub default_assignee: String,
    /// Origin tag stamped on every record this bot creates.
    #[serde(default = "d_source_tag")]
    pub source_tag: String,
    /// When true the description is promoted into `task_number` and the
    /// body cleared; when false the description is retained as well.
    #[serde(default = "d_true")]
    pub promote_description: bool,
    /// Collision retry bound for creates (attempt 1 plus retitled
    /// attempts 2..=N).
    #[serde(default = "d_5")]
    pub max_create_attempts: u32,
    /// Pause between tasks of one batch so confirmations arrive in
    /// order. Presentation only.
    #[serde(default = "d_400u")]
    pub inter_task_pause_ms: u64,
    /// Most-recent record count handed to the model on the query path.
    #[serde(default = "d_100")]
    pub query_context_limit: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            default_assignee: d_default_assignee(),
            source_tag: d_source_tag(),
            promote_description: true,
            max_create_attempts: d_5(),
            inter_task_pause_ms: d_400u(),
            query_context_limit: d_100(),
        }
    }
}

// ── serde default helpers ──────────────────────────────────────────

fn d_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn d_gemini_model() -> String {
    "gemini-2.0-flash".into()
}
fn d_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn d_tasks_url() -> String {
    "http://localhost:8000/tasks/".into()
}
fn d_bot_token_env() -> String {
    "DAK_BOT_TOKEN".into()
}
fn d_default_assignee() -> String {
    "Steno".into()
}
fn d_source_tag() -> String {
    "VoiceBot".into()
}
fn d_true() -> bool {
    true
}
fn d_5() -> u32 {
    5
}
fn d_100() -> usize {
    100
}
fn d_400u() -> u64 {
    400
}
fn d_30000u() -> u64 {
    30_000
}
fn d_120000u() -> u64 {
    120_000
}
