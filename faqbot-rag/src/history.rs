//! Bounded conversational memory.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::Message;

/// Who spoke a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

/// A single recorded utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl From<&Turn> for Message {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            TurnRole::User => Message::user(turn.text.clone()),
            TurnRole::Assistant => Message::assistant(turn.text.clone()),
        }
    }
}

/// The most recent turns of a conversation, oldest first.
///
/// Turns are only ever added as complete exchanges (a user turn followed by
/// the assistant's answer), and evicted the same way, so the history always
/// alternates `user, assistant, user, assistant, ...` and never holds more
/// than [`max_turns`](ConversationHistory::max_turns) entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    max_turns: usize,
}

impl ConversationHistory {
    /// Create an empty history holding at most `max_turns` turns.
    ///
    /// `max_turns` is rounded down to an even number, with a floor of one
    /// exchange.
    pub fn new(max_turns: usize) -> Self {
        let max_turns = max_turns.max(2) & !1;
        Self { turns: VecDeque::with_capacity(max_turns + 2), max_turns }
    }

    /// Record a completed exchange, evicting the oldest exchanges beyond capacity.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push_back(Turn { role: TurnRole::User, text: question.into() });
        self.turns.push_back(Turn { role: TurnRole::Assistant, text: answer.into() });
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Convert the history into chat messages, oldest first.
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns.iter().map(Message::from).collect()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    #[test]
    fn evicts_whole_exchanges() {
        let mut history = ConversationHistory::new(4);
        history.push_exchange("q1", "a1");
        history.push_exchange("q2", "a2");
        history.push_exchange("q3", "a3");

        let texts: Vec<&str> = history.turns().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["q2", "a2", "q3", "a3"]);
        assert_eq!(history.turns().next().map(|t| t.role), Some(TurnRole::User));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut history = ConversationHistory::default();
        for i in 0..25 {
            history.push_exchange(format!("q{i}"), format!("a{i}"));
            assert!(history.len() <= 10);
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.turns().next().map(|t| t.text.as_str()), Some("q20"));
    }

    #[test]
    fn odd_capacity_rounds_down() {
        assert_eq!(ConversationHistory::new(7).max_turns(), 6);
        assert_eq!(ConversationHistory::new(0).max_turns(), 2);
    }

    #[test]
    fn converts_to_messages() {
        let mut history = ConversationHistory::new(4);
        history.push_exchange("What are your hours?", "9-5 Mon-Fri.");
        let messages = history.to_messages();
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1], Message::assistant("9-5 Mon-Fri."));
    }

    #[test]
    fn clear_empties_history() {
        let mut history = ConversationHistory::new(4);
        history.push_exchange("q", "a");
        history.clear();
        assert!(history.is_empty());
    }
}
