//! Error types for the keyguard

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unrecognized unlock widget: {0}")]
    UnrecognizedWidget(String),

    #[error("launch failed: {0}")]
    Launch(String),

    #[error("bad script line: {0}")]
    Script(String),

    #[error("settings error: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
