use anyhow::Result;
use clap::Parser;

use tablechat::{run_web_server, setup_from_cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let app_config = setup_from_cli(&cli)?;

    run_web_server(&cli, app_config).await
}
