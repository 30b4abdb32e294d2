//! Error types for Kosh

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KoshError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid alphabet table: {0}")]
    InvalidAlphabet(String),

    #[error("Collation error: {0}")]
    Collation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, KoshError>;

impl From<rusqlite::Error> for KoshError {
    fn from(e: rusqlite::Error) -> Self {
        KoshError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for KoshError {
    fn from(e: serde_json::Error) -> Self {
        KoshError::Other(format!("JSON error: {}", e))
    }
}

impl From<std::io::Error> for KoshError {
    fn from(e: std::io::Error) -> Self {
        KoshError::Other(format!("IO error: {}", e))
    }
}

impl serde::Serialize for KoshError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
