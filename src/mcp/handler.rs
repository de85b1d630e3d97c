//! Seam between the transport loop and an adapter's dispatcher

use async_trait::async_trait;
use serde_json::Value;

use crate::error::McpError;
use crate::mcp::prompts::PromptRegistry;
use crate::mcp::types::{CallToolResult, ServerInfo, Tool};

/// An adapter served by [`crate::mcp::server::McpServer`]
#[async_trait]
pub trait McpHandler: Send {
    /// Name and version reported during `initialize`
    fn server_info(&self) -> ServerInfo;

    /// Tool catalog for `tools/list`
    fn list_tools(&self) -> Vec<Tool>;

    /// Run one tool.
    ///
    /// `Err` is reserved for precondition failures (unknown tool, bad
    /// arguments) and is reported as a protocol error. Remote failures come
    /// back as `Ok` results with `isError` set.
    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<CallToolResult, McpError>;

    /// Prompt catalog
    fn prompts(&self) -> &PromptRegistry;
}
