//! `gsheets-mcp serve` command implementation.
//!
//! Serves the tool registry over MCP. stdio is the default transport, which
//! is what desktop MCP clients launch; `--http` serves streamable HTTP
//! instead.

use std::{future::Future, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use gsheets_mcp::{McpService, ToolRegistry};
use rmcp::{service::ServiceExt, transport::stdio};
use tokio::signal;
use tracing::info;

/// Arguments for the `serve` command.
#[derive(Args)]
pub struct ServeArgs {
    /// Serve streamable HTTP instead of stdio.
    #[arg(long, default_value_t = false)]
    pub http: bool,

    /// Address to bind in HTTP mode.
    #[arg(short = 'a', long, default_value = "127.0.0.1:3333")]
    pub addr: String,

    /// HTTP path to mount the MCP endpoint on.
    #[arg(long, default_value = "/mcp")]
    pub path: String,

    /// Path to a credentials TOML file.
    #[arg(long, env = "GSHEETS_CREDENTIALS_PATH")]
    pub credentials: Option<PathBuf>,
}

pub async fn run(args: &ServeArgs) -> Result<()> {
    let shutdown = async {
        let _ = signal::ctrl_c().await;
        info!("Received shutdown signal");
    };
    run_with_shutdown(args, shutdown).await
}

async fn run_with_shutdown<F>(args: &ServeArgs, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let toolbox = super::load_toolbox(args.credentials.clone())?;
    let service = McpService::new(Arc::new(ToolRegistry::sheets()), toolbox);

    if !args.http {
        return run_stdio(service).await;
    }

    eprintln!("{} Starting MCP server...", style("→").cyan());
    eprintln!(
        "{} Loaded {} tool(s)",
        style("✓").green().bold(),
        service.registry().len()
    );

    let addr: SocketAddr = args
        .addr
        .parse()
        .with_context(|| format!("invalid --addr value: {}", args.addr))?;
    let path = normalize_path(&args.path);

    let router = axum::Router::new().nest_service(path.as_str(), service.streamable_http_service());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind MCP server on {addr}"))?;

    info!(address = %addr, path = %path, "Starting MCP server");
    eprintln!(
        "{} MCP server running on http://{}{}",
        style("✓").green().bold(),
        addr,
        path
    );
    eprintln!("Press Ctrl+C to stop\n");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("mcp server error")?;

    info!("MCP server stopped");
    Ok(())
}

/// Runs the MCP server over stdin/stdout until the client disconnects or
/// Ctrl+C is pressed.
///
/// stdout carries protocol frames, so all human-facing output goes to
/// stderr.
async fn run_stdio(service: McpService) -> Result<()> {
    eprintln!("{} Starting MCP stdio server...", style("→").cyan());
    eprintln!(
        "{} Loaded {} tool(s)",
        style("✓").green().bold(),
        service.registry().len()
    );

    let (stdin, stdout) = stdio();
    let running = service
        .serve((stdin, stdout))
        .await
        .context("failed to start MCP stdio server")?;

    eprintln!("{} MCP stdio server running", style("✓").green().bold());
    let cancel = running.cancellation_token();
    let mut waiting = Box::pin(running.waiting());

    tokio::select! {
        result = &mut waiting => {
            result.context("mcp stdio server exited")?;
        }
        _ = signal::ctrl_c() => {
            cancel.cancel();
            let _ = waiting.await;
        }
    }

    info!("MCP stdio server stopped");
    Ok(())
}

/// Ensures the mount path starts with `/`; empty means the default `/mcp`.
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        "/mcp".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct ServeArgsCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/mcp");
        assert_eq!(normalize_path("/custom"), "/custom");
        assert_eq!(normalize_path("custom"), "/custom");
    }

    #[test]
    fn test_serve_args_parse_flags() {
        let cli = ServeArgsCli::try_parse_from([
            "test",
            "--http",
            "--addr",
            "0.0.0.0:9000",
            "--path",
            "sheets",
            "--credentials",
            "creds.toml",
        ])
        .expect("args should parse");
        assert!(cli.serve.http);
        assert_eq!(cli.serve.addr, "0.0.0.0:9000");
        assert_eq!(cli.serve.path, "sheets");
        assert_eq!(cli.serve.credentials, Some(PathBuf::from("creds.toml")));
    }
}
