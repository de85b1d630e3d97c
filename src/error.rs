//! Error types for the MCP adapters
//!
//! This module defines the error hierarchy shared by the Gmail and JobStack
//! servers, plus the coarse [`ErrorKind`] reported back to clients inside
//! error-shaped tool results.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the adapters
#[derive(Error, Debug)]
pub enum AdapterError {
    /// OAuth authentication errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Gmail API errors
    #[error("Gmail API error: {0}")]
    Gmail(#[from] GmailApiError),

    /// TheirStack job search API errors
    #[error("Job search API error: {0}")]
    Jobs(#[from] JobsApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// OAuth authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("OAuth keys file not found: {path}")]
    KeysFileNotFound { path: String },

    #[error("Invalid OAuth keys format: expected 'installed' or 'web' credentials")]
    InvalidKeysFormat,

    #[error("No credentials loaded from {path}")]
    CredentialsNotFound { path: String },

    #[error("Failed to refresh access token: {message}")]
    TokenRefreshFailed { message: String },

    #[error("OAuth callback error: {message}")]
    CallbackError { message: String },

    #[error("Consent was denied: {reason}")]
    ConsentDenied { reason: String },

    #[error("No authorization code provided")]
    NoAuthCode,

    #[error("Token exchange failed: {message}")]
    TokenExchangeFailed { message: String },
}

/// Gmail API errors
#[derive(Error, Debug)]
pub enum GmailApiError {
    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: String },

    #[error("Filter not found: {filter_id}")]
    FilterNotFound { filter_id: String },

    #[error("Invalid filter criteria: {message}")]
    InvalidFilterCriteria { message: String },

    #[error("API request failed: {message}")]
    RequestFailed { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Insufficient permissions: {message}")]
    InsufficientPermissions { message: String },

    #[error(
        "Label {folder_id} was applied to {email_id} but removing it from the inbox failed: {message}"
    )]
    PartialMove {
        email_id: String,
        folder_id: String,
        message: String,
    },
}

/// TheirStack API errors
#[derive(Error, Debug)]
pub enum JobsApiError {
    #[error("API request failed: {status}")]
    RequestFailed { status: u16, body: String },

    #[error("Unexpected response: {message}")]
    InvalidResponse { message: String },

    #[error("Job {job_id} not found in cache. Search first.")]
    JobNotFound { job_id: i64 },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("API config file not found: {path}")]
    ApiConfigNotFound { path: String },

    #[error("API key not found in config file {path}")]
    MissingApiKey { path: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Could not build message: {message}")]
    MessageBuild { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Prompt not found: {name}")]
    UnknownPrompt { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

/// Coarse classification carried by error-shaped tool results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or missing input
    Precondition,
    /// The referenced object does not exist
    NotFound,
    /// The backing API rejected the request
    RemoteApi,
    /// A multi-step operation stopped half way
    PartialFailure,
    /// Credential problems
    Auth,
    /// Anything else (I/O, serialization, transport)
    Internal,
}

impl AdapterError {
    /// Classify this error for reporting inside a tool result
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdapterError::Auth(_) => ErrorKind::Auth,
            AdapterError::Gmail(err) => match err {
                GmailApiError::MessageNotFound { .. } | GmailApiError::FilterNotFound { .. } => {
                    ErrorKind::NotFound
                }
                GmailApiError::InvalidFilterCriteria { .. } => ErrorKind::Precondition,
                GmailApiError::PartialMove { .. } => ErrorKind::PartialFailure,
                _ => ErrorKind::RemoteApi,
            },
            AdapterError::Jobs(JobsApiError::JobNotFound { .. }) => ErrorKind::NotFound,
            AdapterError::Jobs(_) | AdapterError::Http(_) => ErrorKind::RemoteApi,
            AdapterError::Validation(_) | AdapterError::Mcp(_) => ErrorKind::Precondition,
            AdapterError::Config(_) | AdapterError::Io(_) | AdapterError::Json(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::KeysFileNotFound {
            path: "/path/to/keys.json".to_string(),
        };
        assert!(err.to_string().contains("/path/to/keys.json"));
    }

    #[test]
    fn test_error_conversion() {
        let auth_err = AuthError::NoAuthCode;
        let err: AdapterError = auth_err.into();
        assert!(matches!(err, AdapterError::Auth(_)));
    }

    #[test]
    fn test_error_kinds() {
        let not_found: AdapterError = GmailApiError::MessageNotFound {
            message_id: "abc".to_string(),
        }
        .into();
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let partial: AdapterError = GmailApiError::PartialMove {
            email_id: "m1".to_string(),
            folder_id: "Label_1".to_string(),
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(partial.kind(), ErrorKind::PartialFailure);
        assert!(partial.to_string().contains("Label_1"));

        let remote: AdapterError = JobsApiError::RequestFailed {
            status: 500,
            body: String::new(),
        }
        .into();
        assert_eq!(remote.kind(), ErrorKind::RemoteApi);

        let missing: AdapterError = JobsApiError::JobNotFound { job_id: 7 }.into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::PartialFailure).unwrap();
        assert_eq!(json, "\"partial_failure\"");
    }
}
