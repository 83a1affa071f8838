//! Custom error types for arrchive.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrchiveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Token signing error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid backup: {0}")]
    InvalidBackup(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, ArrchiveError>;
