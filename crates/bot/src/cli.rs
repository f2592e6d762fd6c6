use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dak_domain::config::Config;
use dak_domain::error::{Error, Result};

#[derive(Parser)]
#[command(name = "dakbot", about = "Voice-to-action task capture bot")]
pub struct Cli {
    /// Path to the config file (default: ./dakline.toml, optional).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Interactive local chat loop (default).
    Chat,
    /// Print the version and exit.
    Version,
}

/// Load config from the optional TOML file, then apply environment
/// overrides. `API_URL` keeps its historical name.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or_else(|| Path::new("dakline.toml"));
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))?
    } else {
        Config::default()
    };

    if let Ok(url) = std::env::var("API_URL") {
        if !url.trim().is_empty() {
            config.backend.tasks_url = url;
        }
    }

    Ok(config)
}
