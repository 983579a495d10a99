use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot load application secret from {path:?}: {source}")]
    Secret {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Cannot reach OMS at {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("OMS error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected OMS response: {0}")]
    Decode(String),

    #[error("No lumisections recorded for run {run}")]
    NoLumisections { run: u32 },

    #[error("Run {run} has no lumisections inside the window [{min}, {max}]")]
    EmptyWindow { run: u32, min: u32, max: u32 },

    #[error("Malformed timestamp {value:?}, expected YYYY-MM-DDTHH:MM:SSZ")]
    Timestamp { value: String },

    #[error("Impossible pad layout: {0}")]
    Layout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
