use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a screening run
#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("Failure cache {}: {source}", .path.display())]
    FailureCache {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Another screener run holds {}", .path.display())]
    Locked { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
