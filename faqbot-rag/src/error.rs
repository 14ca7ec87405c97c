//! Error types for the `faqbot-rag` crate.

use thiserror::Error;

/// Errors that can occur while building the index or answering a question.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error, including a missing credential.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The document source is missing, unreadable or empty.
    #[error("Failed to load document '{path}': {message}")]
    DocumentLoad {
        /// The path that was being read.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// A document with no text was handed to the chunker.
    #[error("Chunking error: document contains no text")]
    EmptyInput,

    /// Building the vector index failed, usually because the embedding service did.
    #[error("Index build failed")]
    IndexBuild(#[source] Box<RagError>),

    /// A search was issued against an index holding no entries.
    #[error("Vector index is empty")]
    EmptyIndex,

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error returned by the chat-completion service.
    #[error("Model error ({provider}): {message}")]
    ModelError {
        /// The chat model provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Reformulating the question into a standalone query failed.
    #[error("Query rewrite failed")]
    Rewrite(#[source] Box<RagError>),

    /// Retrieving context for the standalone query failed.
    #[error("Retrieval failed")]
    Retrieval(#[source] Box<RagError>),

    /// Generating the final answer failed.
    #[error("Answer synthesis failed")]
    Synthesis(#[source] Box<RagError>),
}

impl RagError {
    /// Whether this error can only happen during startup and should end the process.
    ///
    /// Per-turn failures (rewrite, retrieval, synthesis) are recoverable: the
    /// session reports them and keeps accepting input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RagError::ConfigError(_)
                | RagError::DocumentLoad { .. }
                | RagError::EmptyInput
                | RagError::IndexBuild(_)
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_errors_are_fatal() {
        assert!(RagError::ConfigError("missing key".into()).is_fatal());
        assert!(RagError::EmptyInput.is_fatal());
        assert!(RagError::IndexBuild(Box::new(RagError::EmptyInput)).is_fatal());
    }

    #[test]
    fn turn_errors_are_recoverable() {
        let cause = RagError::ModelError { provider: "mock".into(), message: "boom".into() };
        let err = RagError::Synthesis(Box::new(cause));
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Answer synthesis failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Model error (mock): boom"));
    }
}
