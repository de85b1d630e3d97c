//! JobStack MCP Server
//!
//! Serves the TheirStack job search tools and prompts over stdio.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use gmail_jobstack_mcp::config::JobsConfig;
use gmail_jobstack_mcp::jobs::client::JobStackClient;
use gmail_jobstack_mcp::jobs::snapshot::SnapshotWriter;
use gmail_jobstack_mcp::jobs::tools::JobToolHandler;
use gmail_jobstack_mcp::mcp::server::McpServer;

#[derive(Parser)]
#[command(name = "jobstack-mcp-server")]
#[command(version, about = "JobStack MCP Server - AI/ML job search over the TheirStack API")]
struct Cli {
    /// JSON file holding `api_key` and optional `base_url`, `output_dir`, `profile`
    #[arg(long)]
    api_config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = JobsConfig::load(&cli.api_config)
        .with_context(|| format!("Failed to load API config {}", cli.api_config.display()))?;

    tracing::info!("Writing job snapshots to {}", config.output_dir.display());

    let client = JobStackClient::new(config.api_key.clone()).with_base_url(config.base_url.clone());
    let handler = JobToolHandler::new(client)
        .with_profile(config.profile())
        .with_snapshots(SnapshotWriter::new(config.output_dir.clone()));

    let mut server = McpServer::new(handler);
    server.run_stdio().await.context("MCP server failed")?;

    Ok(())
}
