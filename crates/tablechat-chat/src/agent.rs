use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use tablechat_data::{DataError, Dataset};
use tablechat_llm_api::{ChatMessage, CompletionOptions, LlmApiError, LlmClient};
use tablechat_types::Temperature;

/// Rows of the table included verbatim in the agent's context
pub const MAX_CONTEXT_ROWS: usize = 200;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("No API key configured for the reasoning service")]
    MissingCredential,

    #[error("{0}")]
    Service(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<LlmApiError>() {
            Some(LlmApiError::MissingApiKey(_)) => AgentError::MissingCredential,
            _ => AgentError::Service(format!("{:#}", err)),
        }
    }
}

/// External reasoning service that answers questions about a table
#[async_trait]
pub trait TableAgent: Send + Sync {
    async fn answer(&self, dataset: &Dataset, prompt: &str, temperature: Temperature) -> Result<String, AgentError>;
}

/// Table agent backed by a chat completion model. The table is handed to
/// the model as CSV in the system message.
pub struct LlmTableAgent {
    client: Arc<dyn LlmClient>,
    max_context_rows: usize,
    max_tokens: Option<u32>,
}

impl LlmTableAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            max_context_rows: MAX_CONTEXT_ROWS,
            max_tokens: None,
        }
    }

    pub fn with_max_context_rows(mut self, rows: usize) -> Self {
        self.max_context_rows = rows;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    fn system_message(&self, dataset: &Dataset) -> Result<String, AgentError> {
        let shown = dataset.row_count().min(self.max_context_rows);
        let csv = dataset.to_csv(self.max_context_rows)?;
        let columns = dataset
            .columns()
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>()
            .join(", ");

        let mut message = format!(
            "You are a data analyst working with a table loaded from an uploaded spreadsheet.\n\
             The table has {} rows and {} columns: {}.\n\
             Answer questions using only this table. Compute results carefully and state the answer plainly.\n",
            dataset.row_count(),
            dataset.column_count(),
            columns
        );
        if shown < dataset.row_count() {
            message.push_str(&format!(
                "Only the first {} rows are included below; say so if the answer depends on the rest.\n",
                shown
            ));
        }
        message.push_str("\nTable (CSV):\n");
        message.push_str(&csv);
        Ok(message)
    }
}

#[async_trait]
impl TableAgent for LlmTableAgent {
    async fn answer(&self, dataset: &Dataset, prompt: &str, temperature: Temperature) -> Result<String, AgentError> {
        let messages = vec![
            ChatMessage::system(self.system_message(dataset)?),
            ChatMessage::user(prompt),
        ];
        let options = CompletionOptions {
            temperature: Some(temperature.value()),
            max_tokens: self.max_tokens,
        };

        let response = self.client.chat_completion(&messages, &options).await?;
        if let Some(usage) = &response.usage {
            log::debug!(
                "Agent answer used {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(response.message.content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tablechat_data::CellValue;
    use tablechat_llm_api::LlmResponse;

    /// Records what it was asked and replies with a canned outcome
    struct RecordingClient {
        seen: Mutex<Vec<(Vec<ChatMessage>, CompletionOptions)>>,
        reply: Option<String>,
        missing_key: bool,
    }

    impl RecordingClient {
        fn replying(text: &str) -> Self {
            Self { seen: Mutex::new(Vec::new()), reply: Some(text.to_string()), missing_key: false }
        }
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        fn model(&self) -> &str {
            "recorder"
        }

        async fn chat_completion(
            &self,
            messages: &[ChatMessage],
            options: &CompletionOptions,
        ) -> anyhow::Result<tablechat_llm_api::LlmResponse> {
            self.seen.lock().unwrap().push((messages.to_vec(), options.clone()));
            if self.missing_key {
                return Err(LlmApiError::MissingApiKey("test".into()).into());
            }
            match &self.reply {
                Some(text) => Ok(LlmResponse { message: ChatMessage::assistant(text.clone()), usage: None }),
                None => Err(anyhow::anyhow!("connection refused")),
            }
        }
    }

    fn dataset(rows: usize) -> Dataset {
        Dataset::new(
            vec!["id".into(), "name".into()],
            (0..rows)
                .map(|i| vec![CellValue::Number(i as f64), CellValue::Text(format!("n{}", i))])
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_answer_sends_table_and_temperature() {
        let client = Arc::new(RecordingClient::replying("  There are 3 rows.\n"));
        let agent = LlmTableAgent::new(client.clone());
        let temperature = Temperature::new(0.3).unwrap();

        let answer = agent.answer(&dataset(3), "PROMPT", temperature).await.unwrap();
        assert_eq!(answer, "There are 3 rows.");

        let seen = client.seen.lock().unwrap();
        let (messages, options) = &seen[0];
        assert_eq!(options.temperature, Some(0.3));
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("3 rows and 2 columns: `id`, `name`"));
        assert!(messages[0].content.ends_with("id,name\n0,n0\n1,n1\n2,n2\n"));
        assert_eq!(messages[1], ChatMessage::user("PROMPT"));
    }

    #[tokio::test]
    async fn test_context_rows_are_capped() {
        let client = Arc::new(RecordingClient::replying("ok"));
        let agent = LlmTableAgent::new(client.clone()).with_max_context_rows(2);
        agent.answer(&dataset(5), "q", Temperature::default()).await.unwrap();

        let seen = client.seen.lock().unwrap();
        let system = &seen[0].0[0].content;
        assert!(system.contains("Only the first 2 rows"));
        assert!(!system.contains("n2"));
    }

    #[tokio::test]
    async fn test_errors_are_classified() {
        let client = Arc::new(RecordingClient {
            seen: Mutex::new(Vec::new()),
            reply: None,
            missing_key: true,
        });
        let err = LlmTableAgent::new(client).answer(&dataset(1), "q", Temperature::default()).await;
        assert!(matches!(err, Err(AgentError::MissingCredential)));

        let client = Arc::new(RecordingClient {
            seen: Mutex::new(Vec::new()),
            reply: None,
            missing_key: false,
        });
        let err = LlmTableAgent::new(client).answer(&dataset(1), "q", Temperature::default()).await;
        match err {
            Err(AgentError::Service(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
