use anyhow::{Context, Result};
use colored::Colorize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::app::AppConfig;
use crate::cli::Cli;
use crate::web::server::{WebServer, WebServerConfig};

/// Run the web server
pub async fn run_web_server(cli: &Cli, app_config: AppConfig) -> Result<()> {
    // Parse bind address
    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", cli.bind, cli.port))?;

    println!("{}", "📊 Starting Table Agent...".bright_cyan().bold());
    println!("   Address: {}", addr);
    println!("   Model: {}", app_config.model.bright_green());
    if let Some(url) = &app_config.api_url {
        println!("   API URL: {}", url);
    }
    if !app_config.has_api_key {
        println!("   {}", "No API key configured".yellow());
    }

    let config = WebServerConfig {
        bind_addr: addr,
        dispatcher: app_config.dispatcher,
        preview_rows: cli.preview_rows,
        max_upload_bytes: cli.max_upload_mb.saturating_mul(1024 * 1024),
        transcript_dir: app_config.log_dir,
        model: app_config.model,
        session_idle: Duration::from_secs(cli.session_idle_minutes.saturating_mul(60)),
    };

    WebServer::new(config).start().await
}
