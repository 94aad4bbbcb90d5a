use std::sync::Arc;
use thiserror::Error;

use tablechat_data::Dataset;
use tablechat_types::{ChatHistory, Temperature};

use crate::agent::{AgentError, TableAgent};
use crate::prompt::{build_prompt, DEFAULT_INSTRUCTIONS};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Enter a query first")]
    EmptyQuery,

    #[error("An error occurred: {0}")]
    Agent(#[from] AgentError),
}

/// Turns a question into one agent call and, on success, one more
/// user/assistant exchange.
///
/// The dispatcher owns no session state: it reads the current history and
/// hands back the extended one. On any failure the caller's history is left
/// exactly as it was.
pub struct QueryDispatcher {
    agent: Arc<dyn TableAgent>,
    instructions: String,
}

impl QueryDispatcher {
    pub fn new(agent: Arc<dyn TableAgent>) -> Self {
        Self {
            agent,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub async fn execute(
        &self,
        history: &ChatHistory,
        dataset: &Dataset,
        user_input: &str,
        temperature: Temperature,
    ) -> Result<ChatHistory, DispatchError> {
        let query = user_input.trim();
        if query.is_empty() {
            return Err(DispatchError::EmptyQuery);
        }

        let prompt = build_prompt(&self.instructions, history, query);
        log::info!(
            "Dispatching query ({} prior turns, temperature {})",
            history.len(),
            temperature
        );

        let answer = match self.agent.answer(dataset, &prompt, temperature).await {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Agent call failed: {}", e);
                return Err(e.into());
            }
        };

        Ok(history.with_exchange(query, answer))
    }
}
