//! History-aware query reformulation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::history::ConversationHistory;
use crate::model::{ChatModel, Message};

/// Instruction used to turn a follow-up question into a standalone query.
pub const DEFAULT_REWRITE_INSTRUCTION: &str = "Given the chat history and the latest user \
question, which might reference context in the chat history, formulate a standalone question \
that can be understood without the chat history. Do NOT answer the question. Just reformulate \
it if needed, and otherwise return it as is.";

/// Rewrites follow-up questions so they can be retrieved without conversation context.
///
/// On the first turn of a conversation there is nothing to resolve, so the
/// input is returned verbatim without calling the model.
pub struct QueryRewriter {
    model: Arc<dyn ChatModel>,
    instruction: String,
}

impl QueryRewriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model, instruction: DEFAULT_REWRITE_INSTRUCTION.to_string() }
    }

    /// Replace the system instruction sent to the model.
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// Build the prompt sent to the model for a non-empty history.
    pub fn prompt(&self, history: &ConversationHistory, input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.instruction.clone()));
        messages.extend(history.to_messages());
        messages.push(Message::user(input));
        messages
    }

    /// Produce a standalone query for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Rewrite`] if the model call fails.
    pub async fn rewrite(&self, history: &ConversationHistory, input: &str) -> Result<String> {
        if history.is_empty() {
            return Ok(input.to_string());
        }

        let reply = self.model.complete(&self.prompt(history, input)).await.map_err(|e| {
            debug!(model = self.model.name(), error = %e, "query rewrite failed");
            RagError::Rewrite(Box::new(e))
        })?;

        let standalone = reply.trim();
        if standalone.is_empty() {
            warn!(model = self.model.name(), "model returned an empty rewrite, using raw input");
            return Ok(input.to_string());
        }

        debug!(original = input, standalone, "rewrote query");
        Ok(standalone.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::model::Role;

    /// Replies with a fixed text, or fails when `reply` is `None`.
    struct ScriptedModel {
        reply: Option<String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn replying(reply: &str) -> Self {
            Self { reply: Some(reply.to_string()), seen: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { reply: None, seen: Mutex::new(Vec::new()) }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, messages: &[Message]) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.reply.clone().ok_or_else(|| RagError::ModelError {
                provider: "mock".into(),
                message: "429 Too Many Requests".into(),
            })
        }
    }

    #[tokio::test]
    async fn empty_history_returns_input_verbatim() {
        let model = Arc::new(ScriptedModel::replying("should not be used"));
        let rewriter = QueryRewriter::new(model.clone());

        let history = ConversationHistory::new(10);
        let query = rewriter.rewrite(&history, "  What are your hours? ").await.unwrap();
        assert_eq!(query, "  What are your hours? ");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn follow_up_is_sent_with_history() {
        let model = Arc::new(ScriptedModel::replying(" Are you open on Saturdays? \n"));
        let rewriter = QueryRewriter::new(model.clone());
        let mut history = ConversationHistory::new(10);
        history.push_exchange("What are your hours?", "We are open 9-5 Mon-Fri.");

        let query = rewriter.rewrite(&history, "And Saturdays?").await.unwrap();
        assert_eq!(query, "Are you open on Saturdays?");

        let seen = model.seen.lock().unwrap();
        let prompt = &seen[0];
        assert_eq!(prompt.len(), 4);
        assert_eq!(prompt[0].role, Role::System);
        assert!(prompt[0].content.contains("Do NOT answer"));
        assert_eq!(prompt[1], Message::user("What are your hours?"));
        assert_eq!(prompt[2], Message::assistant("We are open 9-5 Mon-Fri."));
        assert_eq!(prompt[3], Message::user("And Saturdays?"));
    }

    #[tokio::test]
    async fn blank_reply_falls_back_to_input() {
        let rewriter = QueryRewriter::new(Arc::new(ScriptedModel::replying("   ")));
        let mut history = ConversationHistory::new(10);
        history.push_exchange("q", "a");
        assert_eq!(rewriter.rewrite(&history, "next?").await.unwrap(), "next?");
    }

    #[tokio::test]
    async fn model_failure_is_a_rewrite_error() {
        let rewriter = QueryRewriter::new(Arc::new(ScriptedModel::failing()));
        let mut history = ConversationHistory::new(10);
        history.push_exchange("q", "a");

        let err = rewriter.rewrite(&history, "next?").await.unwrap_err();
        assert!(matches!(err, RagError::Rewrite(_)));
        assert!(!err.is_fatal());
    }
}
