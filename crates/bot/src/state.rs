use std::sync::Arc;

use dak_backend::TaskBackend;
use dak_domain::config::Config;
use dak_providers::LanguageModel;

use crate::storage::FileStorage;

/// Everything one inbound message needs, built once per process and
/// passed explicitly to each stage. No module-level handles.
pub struct AppState {
    pub config: Config,
    pub model: Arc<dyn LanguageModel>,
    pub backend: Arc<dyn TaskBackend>,
    pub storage: Arc<dyn FileStorage>,
}
