use thiserror::Error;

use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for RagError {
    #[inline]
    fn from(error: sqlx::Error) -> Self {
        Self::Database(error.to_string())
    }
}

pub mod chat;
pub mod client;
pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod indexer;
