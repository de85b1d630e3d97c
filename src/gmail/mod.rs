//! Gmail API module
//!
//! Contains authentication, the API client, message composition and parsing,
//! and the MCP tool/prompt catalog for the Gmail server.

pub mod api;
pub mod auth;
pub mod client;
pub mod compose;
pub mod filters;
pub mod labels;
pub mod mime;
pub mod prompts;
pub mod tools;
pub mod types;

pub use api::MailApi;
pub use auth::{Authenticator, TokenProvider};
pub use client::GmailClient;
pub use tools::MailToolHandler;
