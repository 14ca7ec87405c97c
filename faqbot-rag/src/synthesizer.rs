//! Grounded answer generation from retrieved context.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::SearchResult;
use crate::error::{RagError, Result};
use crate::history::ConversationHistory;
use crate::model::{ChatModel, Message};

/// Placeholder replaced by the retrieved chunk texts.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Default system instruction for answering from context.
pub const DEFAULT_ANSWER_INSTRUCTION: &str = "Use the given context to answer the question.
If you don't know the answer, say that you don't know.
Use three sentences maximum and keep the answer concise.

Context: {context}";

/// Answers a question using only the retrieved chunks.
///
/// The prompt is a single system message carrying the instruction and the
/// concatenated context, followed by the conversation history and the
/// question itself.
pub struct AnswerSynthesizer {
    model: Arc<dyn ChatModel>,
    instruction: String,
}

impl AnswerSynthesizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, instruction: DEFAULT_ANSWER_INSTRUCTION.to_string() }
    }

    /// Replace the system instruction template.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the template has no `{context}`
    /// placeholder.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Result<Self> {
        let instruction = instruction.into();
        if !instruction.contains(CONTEXT_PLACEHOLDER) {
            return Err(RagError::ConfigError(format!(
                "answer instruction must contain the {CONTEXT_PLACEHOLDER} placeholder"
            )));
        }
        self.instruction = instruction;
        Ok(self)
    }

    /// Build the prompt for `question`.
    pub fn prompt(
        &self,
        context: &[SearchResult],
        history: &ConversationHistory,
        question: &str,
    ) -> Vec<Message> {
        let joined =
            context.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.instruction.replace(CONTEXT_PLACEHOLDER, &joined)));
        messages.extend(history.to_messages());
        messages.push(Message::user(question));
        messages
    }

    /// Generate an answer to `question` grounded in `context`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Synthesis`] if the model call fails. There is no retry.
    pub async fn synthesize(
        &self,
        context: &[SearchResult],
        history: &ConversationHistory,
        question: &str,
    ) -> Result<String> {
        let messages = self.prompt(context, history, question);
        let answer = self.model.complete(&messages).await.map_err(|e| {
            debug!(model = self.model.name(), error = %e, "answer synthesis failed");
            RagError::Synthesis(Box::new(e))
        })?;

        info!(model = self.model.name(), context_chunks = context.len(), "answer generated");
        Ok(answer.trim().to_string())
    }
}
