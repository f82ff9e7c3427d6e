use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
