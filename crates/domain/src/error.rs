/// Shared error type used across all dakline crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("model: {0}")]
    Model(String),

    #[error("backend HTTP {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("extraction: {0}")]
    Extraction(String),

    #[error("reference: {0}")]
    Reference(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
