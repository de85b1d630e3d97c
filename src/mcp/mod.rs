//! MCP (Model Context Protocol) module
//!
//! Implements the MCP server protocol shared by both adapters: wire types, the
//! stdio loop, the dispatcher seam, prompt templates and argument schemas.

pub mod handler;
pub mod prompts;
pub mod schema;
pub mod server;
pub mod types;

pub use handler::McpHandler;
pub use server::McpServer;
