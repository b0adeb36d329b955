//! Model Context Protocol server over the tool registry.
//!
//! `McpService` implements [`ServerHandler`]: `list_tools` returns every
//! registered tool with its schemas, and `call_tool` dispatches by name to
//! the shared [`SheetsToolbox`]. Tool failures come back as error results
//! carrying the error message; only protocol-level problems (unknown tool,
//! undecodable arguments) are returned as MCP errors.

use std::{borrow::Cow, sync::Arc};

use gsheets::SheetsToolbox;
use rmcp::{
    ErrorData, RoleServer,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    },
};
use tracing::{error, warn};

use crate::registry::{ToolCallError, ToolInfo, ToolRegistry};

const INSTRUCTIONS: &str = "\
Google Sheets tools. Spreadsheets are addressed by the id in their URL \
(docs.google.com/spreadsheets/d/<id>/edit).

Ranges for cell tools use A1 notation: Sheet1!A1:D10, 'My Sheet'!A:A. \
Structural tools take 0-based indices with exclusive ends: start_row=0, \
end_row=1 is the first row; start_col=0, end_col=3 is columns A..C. \
Sheets may be given by numeric id or by title.

Typical workflows:
- Build a report: create_spreadsheet -> write_cells -> format_cells -> create_chart.
- Inspect data: get_spreadsheet_info -> read_cells or batch_read.
- Grow a table: get_last_row -> append_rows.";

/// MCP server exposing the spreadsheet tools.
#[derive(Clone)]
pub struct McpService {
    registry: Arc<ToolRegistry>,
    toolbox: Arc<SheetsToolbox>,
    info: ServerInfo,
}

impl McpService {
    pub fn new(registry: Arc<ToolRegistry>, toolbox: Arc<SheetsToolbox>) -> Self {
        Self {
            registry,
            toolbox,
            info: default_server_info(),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Streamable HTTP service in stateless mode, ready to mount in an axum
    /// router.
    pub fn streamable_http_service(&self) -> StreamableHttpService<Self, LocalSessionManager> {
        let service = self.clone();
        StreamableHttpService::new(
            move || Ok(service.clone()),
            Arc::default(),
            StreamableHttpServerConfig {
                stateful_mode: false,
                ..Default::default()
            },
        )
    }
}

impl ServerHandler for McpService {
    fn get_info(&self) -> ServerInfo {
        self.info.clone()
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        let registry = Arc::clone(&self.registry);
        async move {
            Ok(ListToolsResult::with_all_items(
                registry.list().map(tool_info_to_mcp).collect(),
            ))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let registry = Arc::clone(&self.registry);
        let toolbox = Arc::clone(&self.toolbox);
        async move {
            let handle = registry.get(&request.name).ok_or_else(|| {
                ErrorData::resource_not_found(format!("tool not found: {}", request.name), None)
            })?;

            match handle
                .call(toolbox, request.arguments.unwrap_or_default())
                .await
            {
                Ok(value) => Ok(CallToolResult::structured(value)),
                Err(ToolCallError::InvalidArguments(err)) => Err(ErrorData::invalid_params(
                    format!("invalid arguments: {err}"),
                    None,
                )),
                Err(ToolCallError::Tool(err)) => {
                    if err.is_caller_error() {
                        warn!(tool = %request.name, error = %err, "tool rejected input");
                    } else {
                        error!(tool = %request.name, error = %err, "tool failed");
                    }
                    Ok(CallToolResult::error(vec![Content::text(err.to_string())]))
                }
                Err(err) => Err(ErrorData::internal_error(err.to_string(), None)),
            }
        }
    }
}

fn default_server_info() -> ServerInfo {
    ServerInfo {
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        instructions: Some(INSTRUCTIONS.to_string()),
        ..Default::default()
    }
}

fn tool_info_to_mcp(info: &ToolInfo) -> Tool {
    Tool {
        name: Cow::Borrowed(info.name),
        title: Some(info.title.to_string()),
        description: Some(Cow::Borrowed(info.description)),
        input_schema: Arc::new(info.input_schema.clone()),
        output_schema: Some(Arc::new(info.output_schema.clone())),
        annotations: None,
        icons: None,
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use gsheets::GoogleCredential;
    use rmcp::{
        model::JsonObject, service::ServiceExt, transport::StreamableHttpClientTransport,
    };
    use serde_json::{Value, json};
    use tokio::sync::oneshot;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    fn json_object(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            _ => JsonObject::default(),
        }
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let info = default_server_info();
        assert!(info.capabilities.tools.is_some());
        assert!(
            info.instructions
                .as_deref()
                .is_some_and(|text| text.contains("A1 notation"))
        );
    }

    #[test]
    fn test_tool_info_to_mcp_copies_schemas() {
        let registry = ToolRegistry::sheets();
        let info = registry.list().next().unwrap();
        let tool = tool_info_to_mcp(info);
        assert_eq!(tool.name, "create_spreadsheet");
        assert_eq!(tool.input_schema.get("type"), Some(&json!("object")));
        assert!(tool.output_schema.is_some());
    }

    #[tokio::test]
    async fn test_mcp_end_to_end() -> Result<()> {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/spreadsheets/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "spreadsheetId": "abc123",
                "properties": {"title": "Budget"},
                "sheets": [{"properties": {"sheetId": 0, "title": "Sheet1", "index": 0}}]
            })))
            .mount(&backend)
            .await;
        Mock::given(method("POST"))
            .and(path("/v4/spreadsheets/abc123:batchUpdate"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error": {"message": "Invalid requests[0].deleteSheet: You can't remove all the sheets in a document."}}"#,
            ))
            .mount(&backend)
            .await;

        let credential = GoogleCredential::new("test-token").with_endpoints(
            format!("{}/v4", backend.uri()),
            format!("{}/drive/v3", backend.uri()),
        );
        let toolbox = Arc::new(SheetsToolbox::from_credential(&credential)?);
        let service = McpService::new(Arc::new(ToolRegistry::sheets()), toolbox)
            .streamable_http_service();
        let router = axum::Router::new().nest_service("/mcp", service);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        let uri = format!("http://{addr}/mcp");
        let client = ().serve(StreamableHttpClientTransport::from_uri(uri)).await?;

        let tools = client.list_all_tools().await?;
        assert_eq!(tools.len(), 27);
        assert!(tools.iter().any(|tool| tool.name == "format_cells"));

        let info = client
            .call_tool(CallToolRequestParam {
                name: "list_sheets".into(),
                arguments: Some(json_object(json!({"spreadsheet_id": "abc123"}))),
            })
            .await?;
        let structured = info
            .structured_content
            .expect("list_sheets should return structured content");
        assert_eq!(structured["sheets"][0]["title"], json!("Sheet1"));

        let rejected = client
            .call_tool(CallToolRequestParam {
                name: "delete_sheet".into(),
                arguments: Some(json_object(json!({"spreadsheet_id": "abc123", "sheet_id": 0}))),
            })
            .await?;
        assert_eq!(rejected.is_error, Some(true));
        let text = rejected
            .content
            .first()
            .and_then(|content| content.raw.as_text())
            .map(|text| text.text.clone())
            .unwrap_or_default();
        assert!(text.contains("can't remove all the sheets"), "{text}");

        let missing = client
            .call_tool(CallToolRequestParam {
                name: "no_such_tool".into(),
                arguments: None,
            })
            .await;
        assert!(missing.is_err());

        client.cancel().await?;
        let _ = shutdown_tx.send(());
        let _ = server.await;

        Ok(())
    }
}
