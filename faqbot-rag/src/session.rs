//! Conversation session orchestrator.
//!
//! A [`ConversationSession`] owns one conversation's history and runs the
//! per-turn protocol: rewrite the question into a standalone query, retrieve
//! context for it, synthesize an answer, then record the exchange.
//!
//! # Example
//!
//! ```rust,ignore
//! use faqbot_rag::{ConversationSession, TurnOutcome};
//!
//! let mut session = ConversationSession::builder()
//!     .chat_model(model)
//!     .retriever(retriever)
//!     .history_turns(10)
//!     .build()?;
//!
//! match session.handle("What are your hours?").await? {
//!     TurnOutcome::Answer(answer) => println!("{}", answer.text),
//!     TurnOutcome::Exit => return Ok(()),
//!     TurnOutcome::Empty => {}
//! }
//! ```

use std::sync::Arc;

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::history::ConversationHistory;
use crate::model::ChatModel;
use crate::retriever::Retriever;
use crate::rewriter::QueryRewriter;
use crate::synthesizer::AnswerSynthesizer;

/// Words that end a session, matched case-insensitively.
pub const DEFAULT_EXIT_WORDS: [&str; 2] = ["exit", "salir"];

/// Whether a session is waiting for input or answering a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Processing,
}

/// A successful exchange.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The model's answer.
    pub text: String,
    /// The query actually used for retrieval.
    pub standalone_query: String,
    /// The chunks the answer was grounded in, most similar first.
    pub sources: Vec<SearchResult>,
}

/// The result of handling one line of input.
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The input was an exit word; nothing was processed.
    Exit,
    /// The input was blank; nothing was processed.
    Empty,
    /// The question was answered and recorded in history.
    Answer(Answer),
}

/// One conversation with its own bounded history.
///
/// `handle` takes `&mut self`, so a session processes exactly one exchange
/// at a time. Independent sessions may share the same retriever.
pub struct ConversationSession {
    id: Uuid,
    history: ConversationHistory,
    rewriter: QueryRewriter,
    retriever: Arc<dyn Retriever>,
    synthesizer: AnswerSynthesizer,
    exit_words: Vec<String>,
    state: SessionState,
}

/// Whether `input` is one of `exit_words`, ignoring case and surrounding whitespace.
pub fn is_exit_command(input: &str, exit_words: &[String]) -> bool {
    let input = input.trim();
    exit_words.iter().any(|word| word.eq_ignore_ascii_case(input))
}

impl ConversationSession {
    /// Create a new [`ConversationSessionBuilder`].
    pub fn builder() -> ConversationSessionBuilder {
        ConversationSessionBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn exit_words(&self) -> &[String] {
        &self.exit_words
    }

    /// Forget the conversation so far.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Handle one line of user input.
    ///
    /// Exit words and blank input return immediately without touching any
    /// remote service. Otherwise the exchange runs to completion and is
    /// appended to history.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Rewrite`], [`RagError::Retrieval`] or
    /// [`RagError::Synthesis`] if the corresponding step fails. The history is
    /// left exactly as it was and the session stays usable.
    pub async fn handle(&mut self, input: &str) -> Result<TurnOutcome> {
        let input = input.trim();
        if is_exit_command(input, &self.exit_words) {
            return Ok(TurnOutcome::Exit);
        }
        if input.is_empty() {
            return Ok(TurnOutcome::Empty);
        }

        self.state = SessionState::Processing;
        let span = info_span!("turn", session.id = %self.id, history_turns = self.history.len());
        let result = self.run_exchange(input).instrument(span).await;
        self.state = SessionState::Idle;

        let answer = result?;
        self.history.push_exchange(input, answer.text.clone());
        Ok(TurnOutcome::Answer(answer))
    }

    async fn run_exchange(&self, input: &str) -> Result<Answer> {
        let standalone_query = self.rewriter.rewrite(&self.history, input).await?;

        let sources = self.retriever.retrieve(&standalone_query).await.map_err(|e| match e {
            RagError::Retrieval(_) => e,
            other => RagError::Retrieval(Box::new(other)),
        })?;

        let text = self.synthesizer.synthesize(&sources, &self.history, input).await?;

        info!(
            standalone_query = %standalone_query,
            source_count = sources.len(),
            "exchange completed"
        );
        Ok(Answer { text, standalone_query, sources })
    }
}

/// Builder for constructing a [`ConversationSession`].
///
/// A retriever is always required. Either a chat model, or both a rewriter
/// and a synthesizer, must be supplied; a chat model fills in whichever of
/// the two is missing.
pub struct ConversationSessionBuilder {
    chat_model: Option<Arc<dyn ChatModel>>,
    retriever: Option<Arc<dyn Retriever>>,
    rewriter: Option<QueryRewriter>,
    synthesizer: Option<AnswerSynthesizer>,
    history_turns: usize,
    exit_words: Vec<String>,
}

impl Default for ConversationSessionBuilder {
    fn default() -> Self {
        Self {
            chat_model: None,
            retriever: None,
            rewriter: None,
            synthesizer: None,
            history_turns: RagConfig::default().history_turns,
            exit_words: DEFAULT_EXIT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl ConversationSessionBuilder {
    /// Set the chat model used for rewriting and answering.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Set the retriever.
    pub fn retriever(mut self, retriever: Arc<dyn Retriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    /// Use a preconfigured rewriter instead of one built from the chat model.
    pub fn rewriter(mut self, rewriter: QueryRewriter) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Use a preconfigured synthesizer instead of one built from the chat model.
    pub fn synthesizer(mut self, synthesizer: AnswerSynthesizer) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Set how many turns of history are kept.
    pub fn history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Replace the words that end the session.
    pub fn exit_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exit_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Build the [`ConversationSession`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required component is missing
    /// or `history_turns` is zero or odd.
    pub fn build(self) -> Result<ConversationSession> {
        if self.history_turns == 0 || self.history_turns % 2 != 0 {
            return Err(RagError::ConfigError(format!(
                "history_turns ({}) must be a positive even number",
                self.history_turns
            )));
        }
        let retriever =
            self.retriever.ok_or_else(|| RagError::ConfigError("retriever is required".into()))?;

        let missing_model = || RagError::ConfigError("chat_model is required".into());
        let rewriter = match self.rewriter {
            Some(rewriter) => rewriter,
            None => QueryRewriter::new(self.chat_model.clone().ok_or_else(missing_model)?),
        };
        let synthesizer = match self.synthesizer {
            Some(synthesizer) => synthesizer,
            None => AnswerSynthesizer::new(self.chat_model.clone().ok_or_else(missing_model)?),
        };

        Ok(ConversationSession {
            id: Uuid::new_v4(),
            history: ConversationHistory::new(self.history_turns),
            rewriter,
            retriever,
            synthesizer,
            exit_words: self.exit_words,
            state: SessionState::Idle,
        })
    }
}
