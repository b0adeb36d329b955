//! `gsheets-mcp list` command implementation.
//!
//! Lists the registered tools. Needs no credentials.

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::style;
use gsheets_mcp::{ToolInfo, ToolRegistry};
use serde_json::json;

/// Output format for `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// JSON array with input and output schemas.
    Json,
}

/// Arguments for the `list` command.
#[derive(Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
    pub format: ListFormat,
}

pub fn run(args: &ListArgs) -> Result<()> {
    let registry = ToolRegistry::sheets();

    match args.format {
        ListFormat::Json => {
            let tools: Vec<serde_json::Value> = registry.list().map(tool_to_json).collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        ListFormat::Table => {
            println!(
                "{:<24} {:<24} {}",
                style("TOOL").bold(),
                style("TITLE").bold(),
                style("DESCRIPTION").bold()
            );
            println!("{}", "-".repeat(90));

            for tool in registry.list() {
                let description = truncate_description(tool.description);
                println!("{:<24} {:<24} {description}", tool.name, tool.title);
            }

            println!(
                "\n{} {} tool(s) available",
                style("✓").green(),
                registry.len()
            );
        }
    }

    Ok(())
}

fn tool_to_json(tool: &ToolInfo) -> serde_json::Value {
    json!({
        "name": tool.name,
        "title": tool.title,
        "description": tool.description,
        "inputSchema": tool.input_schema,
        "outputSchema": tool.output_schema,
    })
}

/// Cuts a description to 40 characters, ending in `...` when shortened.
fn truncate_description(description: &str) -> String {
    const MAX_DESCRIPTION_CHARS: usize = 40;
    const ELLIPSIS: &str = "...";
    const TRUNCATED_CHARS: usize = MAX_DESCRIPTION_CHARS - ELLIPSIS.len();

    let mut chars = description.chars();
    let head: String = chars.by_ref().take(MAX_DESCRIPTION_CHARS).collect();

    if chars.next().is_none() {
        return head;
    }

    let prefix: String = head.chars().take(TRUNCATED_CHARS).collect();
    format!("{prefix}{ELLIPSIS}")
}
