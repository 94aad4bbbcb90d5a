//! Table Agent web application
//!
//! Upload a CSV or XLSX file, preview and chart it, and ask an LLM agent
//! questions about it. Each browser session keeps its own dataset, chart
//! and chat history in memory.

pub mod app;
pub mod cli;
pub mod config;
pub mod web;

pub use app::{run_web_server, setup_from_cli, AppConfig};
pub use cli::Cli;
pub use web::{create_router, AppState, SessionManager};
