use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dak_backend::HttpBackend;
use dak_bot::cli::{Cli, Command};
use dak_bot::repl;
use dak_bot::state::AppState;
use dak_bot::storage::DisabledStorage;
use dak_providers::GeminiModel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Chat) => {
            init_tracing();
            let config = dak_bot::cli::load_config(cli.config.as_deref())
                .context("loading configuration")?;

            let model = GeminiModel::from_config(&config.llm)
                .context("initializing language model")?;
            let backend = HttpBackend::from_config(&config.backend)
                .context("initializing backend client")?;

            let state = AppState {
                config,
                model: Arc::new(model),
                backend: Arc::new(backend),
                storage: Arc::new(DisabledStorage),
            };

            tracing::info!(
                backend = %state.config.backend.tasks_url,
                model = %state.config.llm.model,
                "dakbot started"
            );
            repl::run(state).await
        }
        Some(Command::Version) => {
            println!("dakbot {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
