// src/utils/error.rs
use thiserror::Error;

/// Structural failures: the input cannot yield a statement at all. Row-level
/// trouble never lands here; it is recovered and reported as a validation
/// issue instead.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable input: {0}")]
    Unreadable(String),

    #[error("document not recognized as a consolidated account statement")]
    Unrecognized,
}

/// Top-level error for the CLI driver.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parsing failed: {0}")]
    Parse(#[from] ParseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
