//! Flat in-memory vector index.
//!
//! Exhaustive search over every stored vector. Documents are small enough
//! that a brute-force scan beats maintaining an ANN structure.

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::{
    config::DistanceKind,
    errors::RagError,
    record::{Chunk, RagHit},
};

/// Chunks paired with their embeddings, searchable by similarity.
#[derive(Clone, Debug)]
pub struct VectorIndex {
    distance: DistanceKind,
    dim: usize,
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Builds an index from chunks and their vectors (same order).
    ///
    /// # Errors
    /// - [`RagError::EmptyIndex`] for zero chunks
    /// - [`RagError::EmbeddingCountMismatch`] when counts differ
    /// - [`RagError::VectorSizeMismatch`] when dimensions differ
    pub fn build(
        chunks: Vec<Chunk>,
        vectors: Vec<Vec<f32>>,
        distance: DistanceKind,
    ) -> Result<Self, RagError> {
        if chunks.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if vectors.len() != chunks.len() {
            return Err(RagError::EmbeddingCountMismatch {
                got: vectors.len(),
                want: chunks.len(),
            });
        }
        let dim = vectors[0].len();
        if dim == 0 {
            return Err(RagError::VectorSizeMismatch { got: 0, want: 1 });
        }
        if let Some(v) = vectors.iter().find(|v| v.len() != dim) {
            return Err(RagError::VectorSizeMismatch { got: v.len(), want: dim });
        }

        debug!(
            entries = chunks.len(),
            dim,
            distance = distance.as_str(),
            "vector index built"
        );
        Ok(Self {
            distance,
            dim,
            entries: chunks.into_iter().zip(vectors).collect(),
        })
    }

    /// Returns up to `k` hits, closest first. Equal scores keep chunk order.
    ///
    /// # Errors
    /// Returns [`RagError::VectorSizeMismatch`] if `query` has the wrong size.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RagHit>, RagError> {
        if query.len() != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got: query.len(),
                want: self.dim,
            });
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, (_, v))| (self.distance.score(query, v), i))
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let hits: Vec<RagHit> = scored
            .into_iter()
            .take(k)
            .map(|(score, i)| RagHit {
                score,
                chunk: self.entries[i].0.clone(),
            })
            .collect();
        trace!(k, hits = hits.len(), "index search");
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn distance(&self) -> DistanceKind {
        self.distance
    }
}
