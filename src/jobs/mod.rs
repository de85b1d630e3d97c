//! TheirStack job search module
//!
//! Search client, description cleanup, the per-session job cache, snapshot
//! files, and the MCP tool/prompt catalog for the job server.

pub mod cache;
pub mod clean;
pub mod client;
pub mod matching;
pub mod prompts;
pub mod snapshot;
pub mod tools;
pub mod types;

pub use cache::JobCache;
pub use client::{JobSearchApi, JobStackClient};
pub use snapshot::SnapshotWriter;
pub use tools::JobToolHandler;
