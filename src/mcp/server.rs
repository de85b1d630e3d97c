//! MCP Server implementation
//!
//! Implements the Model Context Protocol server for stdio transport. One
//! request is read, handled to completion and answered before the next line
//! is read.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{McpError, Result};
use crate::mcp::handler::McpHandler;
use crate::mcp::types::*;

/// MCP Server over a line-oriented byte stream
pub struct McpServer<H> {
    /// Adapter-specific dispatcher
    handler: H,

    /// Whether the client sent `notifications/initialized`
    initialized: bool,
}

impl<H: McpHandler> McpServer<H> {
    /// Create a new MCP server
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            initialized: false,
        }
    }

    /// Borrow the wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Whether the initialization handshake completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run(stdin, stdout).await
    }

    /// Serve requests from `reader` until it reaches end of input
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                writer.write_all(response_str.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one JSON-RPC message; `None` means nothing is written back
    pub async fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(raw.clone()) {
            Ok(req) => req,
            Err(e) => {
                let id = raw
                    .get("id")
                    .and_then(|id| serde_json::from_value(id.clone()).ok());
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        let outcome = self.dispatch(&request).await;

        if request.is_notification() {
            if let Err(error) = outcome {
                tracing::debug!("Dropping error for notification {}: {}", request.method, error.message);
            }
            return None;
        }

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(error) => JsonRpcResponse::error(request.id, error),
        })
    }

    async fn dispatch(&mut self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        tracing::debug!("Handling {}", request.method);

        match request.method.as_str() {
            methods::INITIALIZE => to_value(self.handle_initialize()),
            methods::INITIALIZED => {
                self.initialized = true;
                Ok(Value::Null)
            }
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => to_value(ListToolsResult {
                tools: self.handler.list_tools(),
            }),
            methods::CALL_TOOL => {
                let params: CallToolParams = parse_params(request)?;
                tracing::info!("Calling tool {}", params.name);

                let result = self
                    .handler
                    .call_tool(&params.name, params.arguments)
                    .await
                    .map_err(protocol_error)?;
                to_value(result)
            }
            methods::LIST_PROMPTS => to_value(ListPromptsResult {
                prompts: self.handler.prompts().list(),
            }),
            methods::GET_PROMPT => {
                let params: GetPromptParams = parse_params(request)?;
                let result = self
                    .handler
                    .prompts()
                    .get(&params.name, params.arguments)
                    .map_err(protocol_error)?;
                to_value(result)
            }
            other => Err(JsonRpcError::method_not_found(other)),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: self.handler.server_info(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    request: &JsonRpcRequest,
) -> std::result::Result<T, JsonRpcError> {
    let params = request
        .params
        .clone()
        .ok_or_else(|| JsonRpcError::invalid_params("Missing params"))?;

    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_value<T: serde::Serialize>(value: T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Every handler-level protocol error is a bad-params reply
fn protocol_error(error: McpError) -> JsonRpcError {
    JsonRpcError::invalid_params(error.to_string())
}
