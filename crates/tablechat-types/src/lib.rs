//! Core types and structures for tablechat
//!
//! This crate provides the session-level chat types shared across all
//! tablechat crates: turns, the append-only history and the sampling
//! temperature handed to the reasoning agent.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default sampling temperature for the reasoning agent
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Temperatures above this tend to produce hallucinated answers
pub const HALLUCINATION_THRESHOLD: f32 = 0.7;

/// Number of rows shown in the data preview
pub const PREVIEW_ROWS: usize = 5;

// ============================================================================
// Chat Types
// ============================================================================

/// Author of a chat turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label used when the turn is embedded in a prompt
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "AI",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in the chat history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    role: Role,
    text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for ChatTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role.prompt_label(), self.text)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("turn {index} should be from {expected} but is from {found}")]
    OutOfOrder {
        index: usize,
        expected: Role,
        found: Role,
    },
    #[error("history ends with an unanswered user turn")]
    Unanswered,
}

/// Ordered log of chat turns for one session, oldest first.
///
/// The only way to grow a history is to append a complete user/assistant
/// exchange, so turns always alternate starting with the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ChatTurn>", into = "Vec<ChatTurn>")]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed user/assistant exchanges
    pub fn exchanges(&self) -> usize {
        self.turns.len() / 2
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Turns in display order, newest first. Does not touch the stored order.
    pub fn newest_first(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().rev()
    }

    /// Append one exchange in place.
    pub fn push_exchange(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ChatTurn::user(question));
        self.turns.push(ChatTurn::assistant(answer));
    }

    /// Return a copy of this history extended by one exchange.
    pub fn with_exchange(&self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push_exchange(question, answer);
        next
    }

    /// Bracketed, comma separated rendering used inside prompts,
    /// e.g. `[USER: how many rows?, AI: 42]`.
    pub fn prompt_transcript(&self) -> String {
        let parts: Vec<String> = self.turns.iter().map(|t| t.to_string()).collect();
        format!("[{}]", parts.join(", "))
    }
}

impl TryFrom<Vec<ChatTurn>> for ChatHistory {
    type Error = HistoryError;

    fn try_from(turns: Vec<ChatTurn>) -> Result<Self, Self::Error> {
        for (index, turn) in turns.iter().enumerate() {
            let expected = if index % 2 == 0 { Role::User } else { Role::Assistant };
            if turn.role != expected {
                return Err(HistoryError::OutOfOrder {
                    index,
                    expected,
                    found: turn.role,
                });
            }
        }
        if turns.len() % 2 != 0 {
            return Err(HistoryError::Unanswered);
        }
        Ok(Self { turns })
    }
}

impl From<ChatHistory> for Vec<ChatTurn> {
    fn from(history: ChatHistory) -> Self {
        history.turns
    }
}

// ============================================================================
// Agent Settings
// ============================================================================

#[derive(Debug, Error, PartialEq)]
#[error("temperature must be between 0 and 1, got {0}")]
pub struct TemperatureError(pub f32);

/// Sampling temperature in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Temperature(f32);

impl Temperature {
    pub fn new(value: f32) -> Result<Self, TemperatureError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TemperatureError(value))
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn may_hallucinate(&self) -> bool {
        self.0 > HALLUCINATION_THRESHOLD
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self(DEFAULT_TEMPERATURE)
    }
}

impl TryFrom<f32> for Temperature {
    type Error = TemperatureError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f32 {
    fn from(t: Temperature) -> Self {
        t.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exchanges_alternate_oldest_first() {
        let mut history = ChatHistory::new();
        for i in 0..3 {
            history.push_exchange(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(history.len(), 6);
        assert_eq!(history.exchanges(), 3);
        for (i, turn) in history.turns().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(turn.role(), expected);
        }
        assert_eq!(history.turns()[0].text(), "q0");
        assert_eq!(history.turns()[5].text(), "a2");
    }

    #[test]
    fn test_newest_first_leaves_store_untouched() {
        let history = ChatHistory::new()
            .with_exchange("first", "one")
            .with_exchange("second", "two");

        let shown: Vec<&str> = history.newest_first().map(|t| t.text()).collect();
        assert_eq!(shown, vec!["two", "second", "one", "first"]);

        let stored: Vec<&str> = history.turns().iter().map(|t| t.text()).collect();
        assert_eq!(stored, vec!["first", "one", "second", "two"]);
    }

    #[test]
    fn test_with_exchange_does_not_modify_original() {
        let original = ChatHistory::new().with_exchange("q", "a");
        let extended = original.with_exchange("q2", "a2");
        assert_eq!(original.len(), 2);
        assert_eq!(extended.len(), 4);
    }

    #[test]
    fn test_prompt_transcript() {
        assert_eq!(ChatHistory::new().prompt_transcript(), "[]");
        let history = ChatHistory::new().with_exchange("how many rows?", "42");
        assert_eq!(history.prompt_transcript(), "[USER: how many rows?, AI: 42]");
    }

    #[test]
    fn test_deserialize_rejects_broken_alternation() {
        let json = r#"[{"role":"assistant","text":"hi"},{"role":"user","text":"yo"}]"#;
        let err = serde_json::from_str::<ChatHistory>(json).unwrap_err();
        assert!(err.to_string().contains("should be from user"));

        let dangling = r#"[{"role":"user","text":"hi"}]"#;
        assert!(serde_json::from_str::<ChatHistory>(dangling).is_err());

        let ok = r#"[{"role":"user","text":"hi"},{"role":"assistant","text":"yo"}]"#;
        let history: ChatHistory = serde_json::from_str(ok).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_temperature_bounds() {
        assert_eq!(Temperature::default().value(), 0.5);
        assert!(Temperature::new(0.0).is_ok());
        assert!(Temperature::new(1.0).is_ok());
        assert_eq!(Temperature::new(1.5), Err(TemperatureError(1.5)));
        assert!(Temperature::new(-0.1).is_err());
        assert!(Temperature::new(f32::NAN).is_err());
        assert!(Temperature::new(0.8).unwrap().may_hallucinate());
        assert!(!Temperature::new(0.7).unwrap().may_hallucinate());
    }
}
