//! # faqbot-rag
//!
//! Conversational question answering over a plain-text corpus.
//!
//! The crate splits a document into overlapping chunks, embeds them into an
//! in-memory [`VectorIndex`], and answers questions through a
//! [`ConversationSession`] that keeps a short, bounded history:
//!
//! 1. [`QueryRewriter`] turns a follow-up question into a standalone query.
//! 2. [`Retriever`] embeds that query and fetches the most similar chunks.
//! 3. [`AnswerSynthesizer`] asks the chat model to answer from those chunks only.
//!
//! Remote services sit behind the [`EmbeddingProvider`] and [`ChatModel`]
//! traits. OpenAI implementations are available with the `openai` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use faqbot_rag::{
//!     openai::{OpenAIChatModel, OpenAIConfig, OpenAIEmbeddingProvider},
//!     Chunker, ConversationSession, Document, IndexRetriever, RagConfig,
//!     SlidingWindowChunker, VectorIndex,
//! };
//!
//! let config = RagConfig::default();
//! let openai = OpenAIConfig::from_env()?;
//! let embedder = Arc::new(OpenAIEmbeddingProvider::new(openai.clone())?);
//!
//! let chunks = SlidingWindowChunker::from_config(&config)?.chunk(&document)?;
//! let index = Arc::new(VectorIndex::build(chunks, embedder.as_ref(), 512).await?);
//!
//! let mut session = ConversationSession::builder()
//!     .chat_model(Arc::new(OpenAIChatModel::new(openai)?))
//!     .retriever(Arc::new(IndexRetriever::from_config(index, embedder, &config)))
//!     .build()?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod history;
pub mod index;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retriever;
pub mod rewriter;
pub mod session;
pub mod synthesizer;

pub use chunking::{Chunker, SlidingWindowChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use history::{ConversationHistory, Turn, TurnRole};
pub use index::{IndexEntry, VectorIndex};
pub use model::{ChatModel, Message, Role};
pub use retriever::{IndexRetriever, Retriever};
pub use rewriter::QueryRewriter;
pub use session::{
    Answer, ConversationSession, ConversationSessionBuilder, SessionState, TurnOutcome,
    is_exit_command,
};
pub use synthesizer::AnswerSynthesizer;
