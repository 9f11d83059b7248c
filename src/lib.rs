use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Chunking error: {0}")]
    Chunking(#[from] embeddings::chunking::ChunkingError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Nothing to add: '{0}' contains no text")]
    NothingToAdd(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod knowledge;
pub mod prompt;
