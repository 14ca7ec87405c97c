//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use faqbot_rag::RagConfig;
use faqbot_rag::openai::{DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, OpenAIConfig};

/// Ask questions about a plain-text FAQ document.
///
/// Requires `OPENAI_API_KEY` in the environment or in a `.env` file.
#[derive(Debug, Clone, Parser)]
#[command(name = "faqbot", version, about)]
pub struct Args {
    /// Plain-text document to answer questions from.
    #[arg(short, long, env = "FAQBOT_DOCUMENT", default_value = "docs/faq.txt")]
    pub document: PathBuf,

    /// Maximum chunk size in bytes.
    #[arg(long, default_value_t = 1000)]
    pub chunk_size: usize,

    /// Bytes shared by neighbouring chunks.
    #[arg(long, default_value_t = 200)]
    pub chunk_overlap: usize,

    /// Cut chunks at fixed offsets instead of paragraph or sentence breaks.
    #[arg(long)]
    pub no_boundaries: bool,

    /// Number of chunks retrieved per question.
    #[arg(long, default_value_t = 4)]
    pub top_k: usize,

    /// Drop retrieved chunks scoring below this cosine similarity.
    #[arg(long, default_value_t = 0.0)]
    pub similarity_threshold: f32,

    /// Turns of conversation remembered (two per exchange).
    #[arg(long, default_value_t = 10)]
    pub history_turns: usize,

    /// Chunks sent per embedding request.
    #[arg(long, default_value_t = 512)]
    pub embedding_batch_size: usize,

    /// Chat-completion model.
    #[arg(long, env = "FAQBOT_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
    pub chat_model: String,

    /// Embedding model.
    #[arg(long, env = "FAQBOT_EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Sampling temperature for the chat model.
    #[arg(long, default_value_t = 0.3)]
    pub temperature: f32,

    /// Timeout for each request to the remote services, in seconds.
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Words that end the session (case-insensitive).
    #[arg(long = "exit-word", default_values = ["exit", "salir"])]
    pub exit_words: Vec<String>,

    /// Print the chunks each answer was grounded in.
    #[arg(long)]
    pub show_sources: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Build and validate the pipeline configuration.
    pub fn rag_config(&self) -> faqbot_rag::Result<RagConfig> {
        RagConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .prefer_boundaries(!self.no_boundaries)
            .top_k(self.top_k)
            .similarity_threshold(self.similarity_threshold)
            .history_turns(self.history_turns)
            .embedding_batch_size(self.embedding_batch_size)
            .build()
    }

    /// Apply model and timeout flags on top of a credential-bearing config.
    pub fn apply_openai_overrides(&self, mut config: OpenAIConfig) -> OpenAIConfig {
        config.chat_model = self.chat_model.clone();
        config.embedding_model = self.embedding_model.clone();
        config.temperature = self.temperature;
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}
