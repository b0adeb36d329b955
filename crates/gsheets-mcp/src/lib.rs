//! MCP server for the Google Sheets tools.
//!
//! [`ToolRegistry`] describes every tool and dispatches JSON arguments to
//! [`gsheets::SheetsToolbox`]; [`McpService`] puts the registry behind the
//! Model Context Protocol, over stdio or streamable HTTP.

pub mod registry;
pub mod service;

pub use registry::{ToolCallError, ToolHandle, ToolInfo, ToolRegistry};
pub use service::McpService;
