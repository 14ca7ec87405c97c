//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into fixed-dimension vectors.
///
/// The index calls [`embed_batch`](EmbeddingProvider::embed_batch) once per
/// batch of chunks at build time; the retriever calls
/// [`embed`](EmbeddingProvider::embed) once per question. Backends that
/// support native batching should override `embed_batch`, the default
/// embeds one text at a time.
///
/// # Example
///
/// ```rust,ignore
/// use faqbot_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("What are your hours?").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate one embedding per input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
