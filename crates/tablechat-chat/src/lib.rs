//! Conversation management for tablechat
//!
//! This crate holds the query loop: building a prompt from the chat history
//! and the new question, asking the table agent, and returning the extended
//! history for the host to store.

pub mod agent;
pub mod dispatcher;
pub mod prompt;

pub use agent::{AgentError, LlmTableAgent, TableAgent, MAX_CONTEXT_ROWS};
pub use dispatcher::{DispatchError, QueryDispatcher};
pub use prompt::{build_prompt, DEFAULT_INSTRUCTIONS};
