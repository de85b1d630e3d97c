//! Gmail MCP Server
//!
//! Serves the Gmail tools and prompts over stdio. Credentials are resolved
//! before the first request is read, so a missing or refused token fails
//! the process instead of individual tool calls.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gmail_jobstack_mcp::config::Config;
use gmail_jobstack_mcp::gmail::auth::Authenticator;
use gmail_jobstack_mcp::gmail::client::GmailClient;
use gmail_jobstack_mcp::gmail::tools::MailToolHandler;
use gmail_jobstack_mcp::mcp::server::McpServer;

/// Gmail MCP Server
#[derive(Parser)]
#[command(name = "gmail-mcp-server")]
#[command(author, version, about = "Gmail MCP Server - A Model Context Protocol server for Gmail")]
struct Cli {
    /// OAuth client secrets file
    #[arg(long, global = true)]
    creds_file_path: Option<PathBuf>,

    /// Where the access/refresh token is stored
    #[arg(long, global = true)]
    token_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the browser consent flow and store a fresh token
    Auth,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::resolve(cli.creds_file_path, cli.token_path)
        .context("Failed to resolve configuration")?;

    if !config.oauth_keys_exist() {
        anyhow::bail!(
            "OAuth keys file not found at {}. Pass --creds-file-path or set GMAIL_OAUTH_PATH.",
            config.oauth_path.display()
        );
    }

    let authenticator = Authenticator::new(config).context("Failed to load OAuth keys")?;

    match cli.command {
        Some(Commands::Auth) => {
            authenticator
                .authenticate_interactive()
                .await
                .context("Authentication failed")?;
            eprintln!("Authentication completed successfully!");
            Ok(())
        }
        None => run_server(authenticator).await,
    }
}

async fn run_server(authenticator: Authenticator) -> anyhow::Result<()> {
    authenticator
        .acquire()
        .await
        .context("Could not obtain Gmail credentials")?;

    let mut client = GmailClient::new(Arc::new(authenticator));
    match client.profile().await {
        Ok(profile) => {
            tracing::info!("Serving mailbox {}", profile.email_address);
            client = client.with_sender(profile.email_address);
        }
        Err(e) => tracing::warn!("Could not fetch mailbox profile, sending without From: {}", e),
    }

    let mut server = McpServer::new(MailToolHandler::new(client));
    server.run_stdio().await.context("MCP server failed")?;

    Ok(())
}
