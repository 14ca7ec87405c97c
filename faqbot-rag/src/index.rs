//! In-memory vector index using cosine similarity.
//!
//! [`VectorIndex`] is built once from the document chunks and is read-only
//! afterwards, so it can be shared between sessions behind an `Arc` without
//! any locking.

use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// A chunk paired with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The embedding of the chunk's text.
    pub embedding: Vec<f32>,
}

/// An append-once, in-memory vector index.
///
/// Entries keep the order of the chunks they were built from; that order
/// breaks ties between equally similar chunks at search time.
///
/// # Example
///
/// ```rust,ignore
/// use faqbot_rag::VectorIndex;
///
/// let index = VectorIndex::build(chunks, &embedder, 512).await?;
/// let hits = index.search(&query_embedding, 4)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn build_error(provider: &str, message: String) -> RagError {
    RagError::IndexBuild(Box::new(RagError::EmbeddingError {
        provider: provider.to_string(),
        message,
    }))
}

impl VectorIndex {
    /// Embed every chunk and store the resulting entries.
    ///
    /// Chunk texts are sent to the provider in batches of at most
    /// `batch_size`. There are no retries: any provider failure aborts the
    /// build.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexBuild`] if the provider fails, returns a
    /// different number of vectors than texts, or returns vectors of
    /// inconsistent dimensionality.
    pub async fn build(
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingProvider,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let mut embeddings: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());

        for (batch_index, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            debug!(
                provider = provider.name(),
                batch_index,
                batch_size = texts.len(),
                "embedding chunks"
            );

            let vectors = provider.embed_batch(&texts).await.map_err(|e| {
                debug!(provider = provider.name(), error = %e, "embedding failed during build");
                RagError::IndexBuild(Box::new(e))
            })?;

            if vectors.len() != texts.len() {
                return Err(build_error(
                    provider.name(),
                    format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
                ));
            }
            embeddings.extend(vectors);
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_else(|| provider.dimensions());
        if let Some(bad) = embeddings.iter().position(|e| e.len() != dimensions) {
            return Err(build_error(
                provider.name(),
                format!(
                    "embedding {bad} has {} dimensions, expected {dimensions}",
                    embeddings[bad].len()
                ),
            ));
        }

        let entries: Vec<IndexEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        info!(chunk_count = entries.len(), dimensions, "vector index built");
        Ok(Self { entries, dimensions })
    }

    /// Return the `top_k` entries most similar to `embedding`, best first.
    ///
    /// Equal scores keep their original chunk order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyIndex`] if the index holds no entries, or
    /// [`RagError::EmbeddingError`] if the query's dimensionality does not
    /// match the index.
    pub fn search(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if embedding.len() != self.dimensions {
            return Err(RagError::EmbeddingError {
                provider: "VectorIndex".into(),
                message: format!(
                    "query has {} dimensions, index has {}",
                    embedding.len(),
                    self.dimensions
                ),
            });
        }

        let mut scored: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, embedding),
            })
            .collect();

        // `sort_by` is stable, so ties stay in chunk order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All entries in chunk order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }
}
