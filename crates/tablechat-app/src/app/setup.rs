use anyhow::{Context, Result};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tablechat_chat::{LlmTableAgent, QueryDispatcher};
use tablechat_llm_api::{BackendType, ClientFactory, LlmClient, DEFAULT_MODEL};
use tablechat_logging::get_logs_dir;

use crate::cli::Cli;
use crate::config::{resolve_api_key, Secrets, OPENAI_API_KEY_ENV};

/// Application configuration derived from CLI arguments, environment and
/// the secrets file
pub struct AppConfig {
    pub dispatcher: Arc<QueryDispatcher>,
    pub model: String,
    pub api_url: Option<String>,
    pub has_api_key: bool,
    pub log_dir: Option<PathBuf>,
}

/// Set up application configuration from CLI arguments
pub fn setup_from_cli(cli: &Cli) -> Result<AppConfig> {
    let secrets = Secrets::load(&cli.secrets_file)?;
    let env_key = env::var(OPENAI_API_KEY_ENV).ok();

    let api_key = match resolve_api_key(cli.api_key.as_deref(), env_key.as_deref(), &secrets) {
        Some((key, source)) => {
            log::info!("Using API key from {}", source.describe());
            Some(key)
        }
        None => {
            eprintln!(
                "{} No API key found. Set {} or add openai_api_key to {}; queries will fail until then.",
                "⚠️".yellow(),
                OPENAI_API_KEY_ENV,
                cli.secrets_file.display()
            );
            None
        }
    };
    let has_api_key = api_key.is_some();

    // Precedence: CLI flags (with env fallback) > secrets file > defaults
    let api_url = cli.api_url.clone().or(secrets.api_url);
    let model = cli
        .model
        .clone()
        .or(secrets.model)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let backend = match &cli.backend {
        Some(name) => BackendType::from_str(name)
            .with_context(|| format!("Unknown backend '{}': use openai, groq or llama", name))?,
        None => BackendType::detect(api_url.as_deref()),
    };

    let log_dir = if cli.log_requests {
        let dir = get_logs_dir()?;
        eprintln!("{} Logging requests and transcripts to {}", "📝".cyan(), dir.display());
        Some(dir)
    } else {
        None
    };

    let client = ClientFactory::create_with_logging(backend, api_key, model.clone(), api_url.clone(), log_dir.clone());
    let dispatcher = build_dispatcher(client, cli);

    Ok(AppConfig {
        dispatcher: Arc::new(dispatcher),
        model,
        api_url,
        has_api_key,
        log_dir,
    })
}

fn build_dispatcher(client: Arc<dyn LlmClient>, cli: &Cli) -> QueryDispatcher {
    let mut agent = LlmTableAgent::new(client).with_max_context_rows(cli.context_rows);
    if let Some(max_tokens) = cli.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }

    let dispatcher = QueryDispatcher::new(Arc::new(agent));
    match &cli.instructions {
        Some(instructions) => dispatcher.with_instructions(instructions.clone()),
        None => dispatcher,
    }
}
