//! Configuration management for the MCP adapters
//!
//! Handles paths, environment variables, and configuration loading for the
//! Gmail server and the JobStack API config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AdapterError, ConfigError, Result};
use crate::jobs::types::UserProfile;

/// Configuration for the Gmail MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to OAuth keys file (client credentials)
    pub oauth_path: PathBuf,

    /// Path to stored credentials (access/refresh tokens)
    pub credentials_path: PathBuf,

    /// Port for the local consent callback listener (0 picks a free port)
    pub oauth_callback_port: u16,

    /// Gmail API scopes
    pub scopes: Vec<String>,
}

impl Config {
    /// Create a configuration with default paths
    pub fn new() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Resolve paths from explicit flags, then environment, then `~/.gmail-mcp`
    pub fn resolve(oauth_path: Option<PathBuf>, credentials_path: Option<PathBuf>) -> Result<Self> {
        let oauth_path = match oauth_path.or_else(|| env_path("GMAIL_OAUTH_PATH")) {
            Some(path) => path,
            None => Self::get_config_dir()?.join("gcp-oauth.keys.json"),
        };

        let credentials_path = match credentials_path.or_else(|| env_path("GMAIL_CREDENTIALS_PATH")) {
            Some(path) => path,
            None => Self::get_config_dir()?.join("credentials.json"),
        };

        let oauth_callback_port = std::env::var("GMAIL_OAUTH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(0);

        Ok(Self::from_paths(oauth_path, credentials_path).with_callback_port(oauth_callback_port))
    }

    /// Build a configuration from explicit file locations
    pub fn from_paths(oauth_path: impl Into<PathBuf>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            oauth_path: oauth_path.into(),
            credentials_path: credentials_path.into(),
            oauth_callback_port: 0,
            scopes: vec![gmail::SCOPE_MODIFY.to_string()],
        }
    }

    /// Use a fixed callback port instead of an ephemeral one
    pub fn with_callback_port(mut self, port: u16) -> Self {
        self.oauth_callback_port = port;
        self
    }

    /// Get the configuration directory, creating it if necessary
    fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| {
                AdapterError::Config(ConfigError::DirNotFound {
                    path: "~".to_string(),
                })
            })?
            .join(".gmail-mcp");

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|_| {
                AdapterError::Config(ConfigError::DirCreationFailed {
                    path: config_dir.display().to_string(),
                })
            })?;
        }

        Ok(config_dir)
    }

    /// Check if OAuth keys file exists
    pub fn oauth_keys_exist(&self) -> bool {
        self.oauth_path.exists()
    }

    /// Check if credentials (tokens) exist
    pub fn credentials_exist(&self) -> bool {
        self.credentials_path.exists()
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    std::env::var(var).ok().filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Contents of the JobStack `--api-config` file
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Bearer key for the TheirStack API
    #[serde(default)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_jobs_base_url")]
    pub base_url: String,

    /// Directory receiving search snapshots
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Candidate profile used by prompts and match analysis
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

fn default_jobs_base_url() -> String {
    jobs::API_BASE_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(jobs::DEFAULT_OUTPUT_DIR)
}

impl JobsConfig {
    /// Load and validate the API config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::ApiConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)?;
        let config: JobsConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::InvalidConfig {
                message: format!("{}: {}", path.display(), e),
            }
        })?;

        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey {
                path: path.display().to_string(),
            }
            .into());
        }

        Ok(config)
    }

    /// The configured profile, or the built-in one
    pub fn profile(&self) -> UserProfile {
        self.profile.clone().unwrap_or_default()
    }
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";

    /// Scope covering read, send, label and filter management
    pub const SCOPE_MODIFY: &str = "https://www.googleapis.com/auth/gmail.modify";

    /// Query used by get-unread-emails
    pub const UNREAD_QUERY: &str = "in:inbox is:unread category:primary";

    /// Web UI link prefix for open-email
    pub const WEB_MESSAGE_URL: &str = "https://mail.google.com/#all/";

    /// Default cap for search-emails
    pub const DEFAULT_SEARCH_RESULTS: usize = 50;

    /// System label IDs
    pub mod labels {
        pub const INBOX: &str = "INBOX";
        pub const UNREAD: &str = "UNREAD";
    }
}

/// TheirStack API constants
pub mod jobs {
    /// Base URL for the TheirStack API
    pub const API_BASE_URL: &str = "https://api.theirstack.com/v1";

    /// Snapshot directory, relative to the working directory
    pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

    /// Titles every search is restricted to
    pub const TITLES: [&str; 5] = ["AI", "ML", "Machine", "NLP", "Applied"];

    /// Default company technology slug
    pub const DEFAULT_TECHNOLOGY: &str = "greenhouse";

    /// Default job country code
    pub const DEFAULT_COUNTRY: &str = "IN";

    /// Default posting age window
    pub const DEFAULT_MAX_AGE_DAYS: u32 = 7;

    /// Page size requested from the API
    pub const PAGE_LIMIT: u32 = 50;

    /// Number of compact jobs returned to the client
    pub const SUMMARY_JOBS: usize = 10;
}
