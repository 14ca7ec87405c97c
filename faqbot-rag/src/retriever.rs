//! Similarity retrieval over the vector index.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Fetches the chunks most relevant to a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return the best matching chunks for `query`, most similar first.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Retrieval`] wrapping the underlying failure.
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// A [`Retriever`] that embeds the query and searches a shared [`VectorIndex`].
///
/// # Example
///
/// ```rust,ignore
/// let retriever = IndexRetriever::new(Arc::new(index), embedder).with_top_k(4);
/// let results = retriever.retrieve("opening hours").await?;
/// ```
pub struct IndexRetriever {
    index: Arc<VectorIndex>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    similarity_threshold: f32,
}

impl IndexRetriever {
    /// Create a retriever returning the top 4 chunks with no score threshold.
    pub fn new(index: Arc<VectorIndex>, embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        let defaults = RagConfig::default();
        Self {
            index,
            embedding_provider,
            top_k: defaults.top_k,
            similarity_threshold: defaults.similarity_threshold,
        }
    }

    /// Create a retriever using `top_k` and `similarity_threshold` from `config`.
    pub fn from_config(
        index: Arc<VectorIndex>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        config: &RagConfig,
    ) -> Self {
        Self::new(index, embedding_provider)
            .with_top_k(config.top_k)
            .with_similarity_threshold(config.similarity_threshold)
    }

    /// Set the number of chunks returned per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Drop results scoring below `threshold`. Zero or less disables filtering.
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            debug!(error = %e, "embedding failed during retrieval");
            RagError::Retrieval(Box::new(e))
        })?;

        let results = self.index.search(&query_embedding, self.top_k).map_err(|e| {
            debug!(error = %e, "vector index search failed");
            RagError::Retrieval(Box::new(e))
        })?;

        // Cosine scores can be negative, so a zero threshold must not filter.
        let threshold = self.similarity_threshold;
        let filtered: Vec<SearchResult> = if threshold > 0.0 {
            results.into_iter().filter(|r| r.score >= threshold).collect()
        } else {
            results
        };

        debug!(result_count = filtered.len(), top_k = self.top_k, "retrieval completed");
        Ok(filtered)
    }
}
