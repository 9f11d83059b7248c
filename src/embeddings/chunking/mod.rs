#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 200;

/// Configuration for word-window chunking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Number of words in each chunk
    pub chunk_size: usize,
    /// Number of words shared by adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("Invalid chunk size: 0 (must be at least 1 word)")]
    ZeroChunkSize,
    #[error("Overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge { overlap: usize, chunk_size: usize },
}

impl ChunkingConfig {
    #[inline]
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, ChunkingError> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::ZeroChunkSize);
        }

        if self.overlap >= self.chunk_size {
            return Err(ChunkingError::OverlapTooLarge {
                overlap: self.overlap,
                chunk_size: self.chunk_size,
            });
        }

        Ok(())
    }

    /// Number of words the window advances between chunks
    #[inline]
    pub fn step(&self) -> Result<usize, ChunkingError> {
        self.validate()?;
        Ok(self.chunk_size - self.overlap)
    }
}

/// Split text into overlapping windows of whitespace-delimited words.
///
/// Each chunk holds up to `chunk_size` words joined by single spaces, and each window
/// starts `chunk_size - overlap` words after the previous one. The windows continue until
/// the start position passes the last word, so the tail of a document may be covered by
/// several progressively shorter chunks.
///
/// Text without any words produces a single chunk containing the input unchanged.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, ChunkingError> {
    let step = config.step()?;
    let words: Vec<&str> = text.split_whitespace().collect();

    let chunks: Vec<String> = (0..words.len())
        .step_by(step)
        .map(|start| {
            let end = (start + config.chunk_size).min(words.len());
            words[start..end].join(" ")
        })
        .collect();

    if chunks.is_empty() {
        debug!("No words found in text (length: {}), keeping it whole", text.len());
        return Ok(vec![text.to_owned()]);
    }

    debug!(
        "Chunked {} words into {} chunks (size {}, overlap {})",
        words.len(),
        chunks.len(),
        config.chunk_size,
        config.overlap
    );

    Ok(chunks)
}

/// Count the whitespace-delimited words in a text
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
