//! Gmail and JobStack MCP servers
//!
//! Two Model Context Protocol (MCP) adapters sharing one stdio transport:
//! a Gmail server for reading, sending and organizing mail, and a job search
//! server backed by the TheirStack API.

pub mod config;
pub mod error;
pub mod gmail;
pub mod jobs;
pub mod mcp;

pub use config::{Config, JobsConfig};
pub use error::{AdapterError, Result};
