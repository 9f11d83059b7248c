// Knowledge store module
// Owns the session's document chunks and keeps the vector index in step with them

pub mod metadata;


use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::embeddings::EmbeddingProvider;
use crate::embeddings::chunking::{ChunkingConfig, ChunkingError, chunk_text, word_count};
use crate::index::FlatIndex;
use crate::{RagError, Result};

pub use metadata::{CHUNK_ID_KEY, ChunkMetadata, MetadataValue, NAME_KEY, PAGE_KEY};

/// Number of results returned by a search when the caller has no preference
pub const DEFAULT_TOP_K: usize = 3;

/// A chunk retrieved for a query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Squared Euclidean distance between the query and chunk embeddings
    pub distance: f32,
}

/// Summary of a single document ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionReport {
    /// Chunks produced from the new document
    pub chunks_added: usize,
    /// Chunks in the store after ingestion
    pub total_chunks: usize,
    /// Chunks whose embedding failed and were indexed as zero vectors
    pub degraded_embeddings: usize,
}

/// In-memory knowledge base for a single session.
///
/// Chunks and their metadata are stored in parallel, position-aligned lists, and the
/// vector index is rebuilt over every chunk whenever a document is added. Searching
/// is opt-in: a store answers queries only while it is enabled and holds chunks.
pub struct KnowledgeStore<E> {
    embedder: E,
    chunking: ChunkingConfig,
    chunks: Vec<String>,
    metadata: Vec<ChunkMetadata>,
    index: FlatIndex,
    enabled: bool,
}

impl<E: EmbeddingProvider> KnowledgeStore<E> {
    #[inline]
    pub fn new(embedder: E, chunking: ChunkingConfig) -> std::result::Result<Self, ChunkingError> {
        chunking.validate()?;

        Ok(Self {
            embedder,
            chunking,
            chunks: Vec::new(),
            metadata: Vec::new(),
            index: FlatIndex::new(),
            enabled: false,
        })
    }

    /// Chunk a document, append it to the store, and rebuild the index.
    ///
    /// Every chunk in the store is re-embedded, so this makes one embedding request
    /// per stored chunk and can be slow for large stores.
    #[inline]
    pub fn add_document(&mut self, text: &str, metadata: &ChunkMetadata) -> Result<IngestionReport> {
        self.add_document_with_progress(text, metadata, |_, _| {})
    }

    /// Like [`add_document`](Self::add_document), reporting `(embedded, total)` after
    /// each chunk is embedded
    #[inline]
    pub fn add_document_with_progress<F>(
        &mut self,
        text: &str,
        metadata: &ChunkMetadata,
        mut on_progress: F,
    ) -> Result<IngestionReport>
    where
        F: FnMut(usize, usize),
    {
        let name = metadata.name().unwrap_or("<unnamed>");
        if text.trim().is_empty() {
            return Err(RagError::NothingToAdd(name.to_string()));
        }

        let new_chunks = chunk_text(text, &self.chunking)?;
        let chunks_added = new_chunks.len();
        debug!(
            "Document '{}' ({} words) split into {} chunks",
            name,
            word_count(text),
            chunks_added
        );

        let previous_len = self.chunks.len();
        for (chunk_id, chunk) in new_chunks.into_iter().enumerate() {
            self.chunks.push(chunk);
            self.metadata.push(metadata.for_chunk(chunk_id));
        }

        let degraded_embeddings = match self.rebuild_index(&mut on_progress) {
            Ok(degraded) => degraded,
            Err(e) => {
                // the previous index is untouched, so drop the chunks it does not cover
                self.chunks.truncate(previous_len);
                self.metadata.truncate(previous_len);
                return Err(e);
            }
        };

        let report = IngestionReport {
            chunks_added,
            total_chunks: self.chunks.len(),
            degraded_embeddings,
        };

        if degraded_embeddings > 0 {
            warn!(
                "{} of {} chunks could not be embedded and were indexed as zero vectors",
                degraded_embeddings, report.total_chunks
            );
        }
        info!(
            "Added '{}' ({} chunks, {} total in store)",
            name, chunks_added, report.total_chunks
        );

        Ok(report)
    }

    fn rebuild_index(&mut self, on_progress: &mut dyn FnMut(usize, usize)) -> Result<usize> {
        let total = self.chunks.len();
        let mut degraded = 0;
        let mut vectors = Vec::with_capacity(total);

        for (i, chunk) in self.chunks.iter().enumerate() {
            let embedding = self.embedder.embed(chunk);
            if embedding.is_degraded() {
                degraded += 1;
            }
            vectors.push(embedding.into_vector());
            on_progress(i + 1, total);
        }

        self.index.rebuild(&vectors)?;
        Ok(degraded)
    }

    /// Retrieve up to `top_k` chunks nearest to `query`, nearest first.
    ///
    /// Returns nothing while the store is disabled or empty.
    #[inline]
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        if !self.enabled || self.chunks.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let query_vector = self.embedder.embed(query).into_vector();

        let neighbors = match self.index.query(&query_vector, top_k) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                error!("Index query failed: {}", e);
                return Vec::new();
            }
        };

        let results: Vec<SearchResult> = neighbors
            .into_iter()
            .filter_map(|neighbor| {
                let text = self.chunks.get(neighbor.position)?;
                let metadata = self.metadata.get(neighbor.position)?;
                Some(SearchResult {
                    text: text.clone(),
                    metadata: metadata.clone(),
                    distance: neighbor.distance,
                })
            })
            .collect();

        debug!(
            "Search for query (length: {}) returned {} results",
            query.len(),
            results.len()
        );

        results
    }

    /// Turn retrieval on or off; the stored chunks are unaffected.
    ///
    /// A store without chunks cannot be enabled.
    #[inline]
    pub fn toggle(&mut self, enabled: bool) {
        if enabled && self.chunks.is_empty() {
            warn!("Ignoring request to enable an empty knowledge store");
            self.enabled = false;
            return;
        }
        self.enabled = enabled;
    }

    /// Remove every chunk and disable retrieval
    #[inline]
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.metadata.clear();
        self.index.clear();
        self.enabled = false;
        info!("Knowledge store cleared");
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    #[inline]
    pub fn metadata(&self) -> &[ChunkMetadata] {
        &self.metadata
    }

    #[inline]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[inline]
    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }

    #[inline]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }
}
