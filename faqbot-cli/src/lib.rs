//! # faqbot-cli
//!
//! Interactive console for asking questions about a plain-text FAQ.
//!
//! Startup loads the document, chunks it, and embeds every chunk into an
//! in-memory index. Any failure before the first prompt is fatal. Once the
//! console is running, a failed question is reported and the loop goes on.

pub mod args;
pub mod console;
pub mod logging;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use faqbot_rag::openai::{OpenAIChatModel, OpenAIConfig, OpenAIEmbeddingProvider};
use faqbot_rag::{
    Chunker, ConversationSession, Document, IndexRetriever, RagError, SlidingWindowChunker,
    VectorIndex,
};
use tracing::info;

pub use args::Args;
pub use console::{ConsoleOptions, EditorReader, LineReader, run_console};

/// Read a UTF-8 text file into a [`Document`].
///
/// The document id is the file stem and the source URI is the path as given.
///
/// # Errors
///
/// Returns [`RagError::DocumentLoad`] if the file cannot be read or holds
/// only whitespace.
pub fn load_document(path: &Path) -> Result<Document, RagError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path)
        .map_err(|e| RagError::DocumentLoad { path: display.clone(), message: e.to_string() })?;

    if text.trim().is_empty() {
        return Err(RagError::DocumentLoad { path: display, message: "file is empty".into() });
    }

    let id = path.file_stem().and_then(|s| s.to_str()).unwrap_or("document").to_string();
    Ok(Document::new(id, text).with_source_uri(display))
}

/// Build the whole pipeline from `args` and run the console on stdin/stdout.
pub async fn run(args: Args) -> anyhow::Result<()> {
    let openai = args.apply_openai_overrides(OpenAIConfig::from_env()?);
    let config = args.rag_config()?;

    let document = load_document(&args.document)?;
    let chunks = SlidingWindowChunker::from_config(&config)?.chunk(&document)?;
    info!(document = %document.id, chunks = chunks.len(), "document chunked");

    let embedder = Arc::new(OpenAIEmbeddingProvider::new(openai.clone())?);
    let index = VectorIndex::build(chunks, embedder.as_ref(), config.embedding_batch_size)
        .await
        .context("could not index the document")?;
    info!(entries = index.len(), dimensions = index.dimensions(), "index ready");

    let retriever = IndexRetriever::from_config(Arc::new(index), embedder, &config);
    let mut session = ConversationSession::builder()
        .chat_model(Arc::new(OpenAIChatModel::new(openai)?))
        .retriever(Arc::new(retriever))
        .history_turns(config.history_turns)
        .exit_words(&args.exit_words)
        .build()?;
    info!(session.id = %session.id(), "session started");

    let mut reader = EditorReader::new()?;
    run_console(
        &mut session,
        &mut reader,
        &mut io::stdout(),
        &mut io::stderr(),
        ConsoleOptions { show_sources: args.show_sources },
    )
    .await
}
