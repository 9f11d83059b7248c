// Embeddings module
// Chunking of document text and the contract with the external embedding service

pub mod chunking;
pub mod client;


use std::sync::Arc;

use tracing::warn;

pub use chunking::{ChunkingConfig, ChunkingError, chunk_text};
pub use client::EmbeddingClient;

/// Outcome of embedding a single text
#[derive(Debug, Clone, PartialEq)]
pub enum Embedding {
    /// Vector returned by the embedding service
    Generated(Vec<f32>),
    /// The service failed; stands in as a vector of zeros
    Degraded { dimension: usize },
}

impl Embedding {
    #[inline]
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    #[inline]
    pub fn into_vector(self) -> Vec<f32> {
        match self {
            Self::Generated(vector) => vector,
            Self::Degraded { dimension } => vec![0.0; dimension],
        }
    }
}

/// Source of fixed-dimension embedding vectors.
///
/// Implementors only provide [`try_embed`](EmbeddingProvider::try_embed); callers use
/// [`embed`](EmbeddingProvider::embed), which never fails and substitutes a zero vector
/// for any error or for a response of the wrong length.
pub trait EmbeddingProvider {
    /// Length of every vector this provider produces
    fn dimension(&self) -> usize;

    /// Request an embedding, reporting any failure
    fn try_embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    #[inline]
    fn embed(&self, text: &str) -> Embedding {
        let dimension = self.dimension();
        match self.try_embed(text) {
            Ok(vector) if vector.len() == dimension => Embedding::Generated(vector),
            Ok(vector) => {
                warn!(
                    "Embedding has {} dimensions, expected {}; using zero vector",
                    vector.len(),
                    dimension
                );
                Embedding::Degraded { dimension }
            }
            Err(e) => {
                warn!("Error getting embedding, using zero vector: {:#}", e);
                Embedding::Degraded { dimension }
            }
        }
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    #[inline]
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    #[inline]
    fn try_embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        (**self).try_embed(text)
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Arc<T> {
    #[inline]
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    #[inline]
    fn try_embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        (**self).try_embed(text)
    }
}
