//! `gsheets-mcp call` command implementation.
//!
//! Runs a single tool locally, without an MCP client, and prints its output.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use console::style;
use gsheets_mcp::{ToolCallError, ToolRegistry};
use rmcp::model::JsonObject;

/// Arguments for the `call` command.
#[derive(Args)]
pub struct CallArgs {
    /// Tool name (e.g. "read_cells").
    pub tool: String,

    /// Input JSON object (inline or @file.json).
    pub input: String,

    /// Path to a credentials TOML file.
    #[arg(long, env = "GSHEETS_CREDENTIALS_PATH")]
    pub credentials: Option<PathBuf>,
}

pub async fn run(args: &CallArgs) -> Result<()> {
    let registry = ToolRegistry::sheets();
    let Some(handle) = registry.get(&args.tool) else {
        bail!("unknown tool: {} (see `gsheets-mcp list`)", args.tool);
    };

    let input_json = if let Some(path) = args.input.strip_prefix('@') {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file: {path}"))?
    } else {
        args.input.clone()
    };
    let arguments = parse_arguments(&input_json)?;

    eprintln!(
        "{} Calling tool: {}",
        style("→").cyan(),
        style(&args.tool).bold()
    );

    let toolbox = super::load_toolbox(args.credentials.clone())?;

    match handle.call(toolbox, arguments).await {
        Ok(output) => {
            eprintln!("{} Result:", style("✓").green().bold());
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(ToolCallError::Tool(err)) => {
            eprintln!("{} Error: {}", style("✗").red().bold(), err);
            Err(err).context("tool call failed")
        }
        Err(err) => Err(err).context("tool call failed"),
    }
}

fn parse_arguments(input: &str) -> Result<JsonObject> {
    match serde_json::from_str(input).context("invalid input JSON")? {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("input must be a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments_accepts_object() {
        let arguments = parse_arguments(r#"{"spreadsheet_id": "abc123"}"#).unwrap();
        assert_eq!(arguments["spreadsheet_id"], "abc123");
    }

    #[test]
    fn test_parse_arguments_rejects_non_objects() {
        let err = parse_arguments("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("JSON object"));

        let err = parse_arguments("{not json").unwrap_err();
        assert!(err.to_string().contains("invalid input JSON"));
    }

    #[tokio::test]
    async fn test_unknown_tool_fails_before_credentials() {
        let args = CallArgs {
            tool: "no_such_tool".to_string(),
            input: "{}".to_string(),
            credentials: None,
        };
        let err = run(&args).await.unwrap_err();
        assert!(err.to_string().contains("unknown tool: no_such_tool"));
    }
}
