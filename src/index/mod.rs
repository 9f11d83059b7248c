// Exact nearest-neighbor index over embedding vectors


use itertools::Itertools;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Cannot index vectors with zero dimensions")]
    EmptyVector,
}

/// A stored vector close to a query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the vector in the order it was indexed
    pub position: usize,
    /// Squared Euclidean distance to the query
    pub distance: f32,
}

/// Brute-force L2 index, rebuilt from scratch whenever its contents change.
///
/// Vectors are kept contiguously in insertion order. An index built from no vectors
/// is absent and answers every query with no neighbors.
#[derive(Debug, Clone, Default)]
pub struct FlatIndex {
    storage: Option<FlatStorage>,
}

#[derive(Debug, Clone)]
struct FlatStorage {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatStorage {
    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }
}

impl FlatIndex {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the index contents with exactly `vectors`, in order
    #[inline]
    pub fn rebuild(&mut self, vectors: &[Vec<f32>]) -> Result<(), IndexError> {
        let Some(first) = vectors.first() else {
            debug!("Rebuilding index from no vectors, index is now absent");
            self.storage = None;
            return Ok(());
        };

        let dimension = first.len();
        if dimension == 0 {
            return Err(IndexError::EmptyVector);
        }

        let mut data = Vec::with_capacity(dimension * vectors.len());
        for vector in vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        debug!(
            "Rebuilt index with {} vectors of dimension {}",
            vectors.len(),
            dimension
        );
        self.storage = Some(FlatStorage { dimension, data });
        Ok(())
    }

    /// Find the `k` indexed vectors closest to `vector`, nearest first.
    ///
    /// Equal distances are ordered by position so results are reproducible.
    #[inline]
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        let Some(storage) = &self.storage else {
            return Ok(Vec::new());
        };

        if vector.len() != storage.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: storage.dimension,
                actual: vector.len(),
            });
        }

        let neighbors = storage
            .vectors()
            .enumerate()
            .map(|(position, stored)| Neighbor {
                position,
                distance: squared_euclidean(vector, stored),
            })
            .k_smallest_by(k, compare_neighbors)
            .collect();

        Ok(neighbors)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.storage = None;
    }

    /// Number of indexed vectors
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.as_ref().map_or(0, FlatStorage::len)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_none()
    }

    /// Dimension of the indexed vectors, if any are indexed
    #[inline]
    pub fn dimension(&self) -> Option<usize> {
        self.storage.as_ref().map(|storage| storage.dimension)
    }
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then(a.position.cmp(&b.position))
}

/// Squared L2 distance between two vectors of equal length
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}
