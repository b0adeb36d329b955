//! Command-line entry point for the Google Sheets MCP server.
//!
//! Usage:
//! ```bash
//! gsheets-mcp serve                        # MCP over stdio
//! gsheets-mcp serve --http -a 0.0.0.0:3333 # MCP over streamable HTTP
//! gsheets-mcp list                         # List available tools
//! gsheets-mcp call <tool> <json>           # Run one tool
//! gsheets-mcp check <spreadsheet-id>       # Verify credentials and API access
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to adjust the level.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "gsheets-mcp")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the tools over MCP
    Serve(commands::serve::ServeArgs),

    /// List available tools
    List(commands::list::ListArgs),

    /// Call a tool directly
    Call(commands::call::CallArgs),

    /// Check credentials and API access
    Check(commands::check::CheckArgs),
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serve(_) => f.debug_tuple("Serve").finish(),
            Self::List(_) => f.debug_tuple("List").finish(),
            Self::Call(_) => f.debug_tuple("Call").finish(),
            Self::Check(_) => f.debug_tuple("Check").finish(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().context("failed to parse log directive")?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Serve(args) => commands::serve::run(args).await,
        Command::List(args) => commands::list::run(args),
        Command::Call(args) => commands::call::run(args).await,
        Command::Check(args) => commands::check::run(args).await,
    }
}
