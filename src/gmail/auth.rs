//! OAuth authentication for Gmail API
//!
//! Handles the token lifecycle:
//! - Loading client credentials
//! - Loading a persisted token and refreshing it when expired
//! - Interactive browser-based consent on a local callback listener
//! - Persisting every newly obtained token

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Query, response::Html, routing::get, Router};
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, Mutex, RwLock};

use crate::config::Config;
use crate::error::{AdapterError, AuthError, Result};

/// Tokens expiring within this window are treated as expired
const EXPIRY_SKEW_SECS: i64 = 300;

/// Path the consent callback is served on
const CALLBACK_PATH: &str = "/oauth2callback";

/// OAuth client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthKeys {
    /// Client ID
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Auth URI
    pub auth_uri: String,

    /// Token URI
    pub token_uri: String,
}

/// OAuth keys file format (can be "installed" or "web")
#[derive(Debug, Deserialize)]
struct OAuthKeysFile {
    #[serde(alias = "web")]
    installed: Option<OAuthKeys>,
}

/// Stored credentials (tokens)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Access token
    #[serde(alias = "token")]
    pub access_token: String,

    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Token type (usually "Bearer")
    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Expiry timestamp (Unix seconds); `expiry` as an ISO-8601 string is also read
    #[serde(
        default,
        alias = "expiry",
        deserialize_with = "deserialize_expiry",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiry_date: Option<i64>,

    /// Granted scopes
    #[serde(default)]
    pub scopes: Vec<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiryField {
    Seconds(i64),
    Timestamp(String),
}

/// Unix seconds, or an ISO-8601 timestamp (UTC when no offset is given)
fn deserialize_expiry<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let Some(field) = Option::<ExpiryField>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match field {
        ExpiryField::Seconds(secs) => Ok(Some(secs)),
        ExpiryField::Timestamp(text) => parse_expiry(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid expiry timestamp: {}", text))),
    }
}

fn parse_expiry(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp());
    }
    chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

impl StoredCredentials {
    /// Whether the access token can still be used at `now` (Unix seconds)
    pub fn is_valid_at(&self, now: i64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry_date {
            Some(expiry) => expiry - now > EXPIRY_SKEW_SECS,
            None => true,
        }
    }

    /// Whether the access token can still be used now
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(chrono::Utc::now().timestamp())
    }

    fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            token_type: response.token_type,
            expiry_date: response.expires_in.map(|e| now + e),
            scopes: response
                .scope
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Token response from OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    expires_in: Option<i64>,
    #[serde(default)]
    scope: String,
}

/// Source of bearer tokens for API clients
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently usable access token
    async fn access_token(&self) -> Result<String>;
}

/// OAuth authenticator
pub struct Authenticator {
    /// Configuration
    config: Config,

    /// HTTP client
    http_client: reqwest::Client,

    /// OAuth client credentials
    keys: OAuthKeys,

    /// Current credentials (tokens)
    credentials: RwLock<Option<StoredCredentials>>,
}

impl Authenticator {
    /// Create a new authenticator; reads the client keys but no token yet
    pub fn new(config: Config) -> Result<Self> {
        let keys = Self::load_oauth_keys(&config.oauth_path)?;

        Ok(Self {
            config,
            http_client: reqwest::Client::new(),
            keys,
            credentials: RwLock::new(None),
        })
    }

    /// Load OAuth keys from file
    fn load_oauth_keys(path: &Path) -> Result<OAuthKeys> {
        if !path.exists() {
            return Err(AdapterError::Auth(AuthError::KeysFileNotFound {
                path: path.display().to_string(),
            }));
        }

        let content = std::fs::read_to_string(path)?;
        let keys_file: OAuthKeysFile = serde_json::from_str(&content)?;

        keys_file
            .installed
            .ok_or(AdapterError::Auth(AuthError::InvalidKeysFormat))
    }

    /// Load stored credentials from file, if any usable file exists
    async fn load_credentials(&self) -> Option<StoredCredentials> {
        if !self.config.credentials_exist() {
            return None;
        }

        let path = &self.config.credentials_path;
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Could not read token file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(creds) => Some(creds),
            Err(e) => {
                tracing::warn!("Ignoring malformed token file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Save credentials to file, replacing any previous token
    async fn save_credentials(&self, credentials: &StoredCredentials) -> Result<()> {
        let path = &self.config.credentials_path;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(credentials)?;
        tokio::fs::write(path, content).await?;
        tracing::info!("Token saved to {}", path.display());
        Ok(())
    }

    async fn store(&self, credentials: StoredCredentials) -> Result<StoredCredentials> {
        self.save_credentials(&credentials).await?;
        *self.credentials.write().await = Some(credentials.clone());
        Ok(credentials)
    }

    /// Produce a usable token: stored, refreshed, or freshly consented
    pub async fn acquire(&self) -> Result<StoredCredentials> {
        let stored = self.load_credentials().await;

        match stored {
            Some(creds) if creds.is_valid() => {
                tracing::info!("Loaded token from {}", self.config.credentials_path.display());
                *self.credentials.write().await = Some(creds.clone());
                Ok(creds)
            }
            Some(StoredCredentials {
                refresh_token: Some(refresh_token),
                ..
            }) => {
                tracing::info!("Stored token expired, refreshing");
                self.refresh(&refresh_token).await
            }
            _ => {
                tracing::info!("No usable token, starting consent flow");
                self.authenticate_interactive().await
            }
        }
    }

    /// Get a valid access token, refreshing if necessary
    pub async fn get_access_token(&self) -> Result<String> {
        let current = self.credentials.read().await.clone();

        match current {
            Some(creds) if creds.is_valid() => Ok(creds.access_token),
            Some(StoredCredentials {
                refresh_token: Some(refresh_token),
                ..
            }) => Ok(self.refresh(&refresh_token).await?.access_token),
            Some(_) => Err(AdapterError::Auth(AuthError::TokenRefreshFailed {
                message: "No refresh token available".to_string(),
            })),
            None => Err(AdapterError::Auth(AuthError::CredentialsNotFound {
                path: self.config.credentials_path.display().to_string(),
            })),
        }
    }

    /// Refresh the access token using the refresh token
    async fn refresh(&self, refresh_token: &str) -> Result<StoredCredentials> {
        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenRefreshFailed {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Auth(AuthError::TokenRefreshFailed {
                message: format!("{}: {}", status, text),
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        let credentials =
            StoredCredentials::from_response(token_response, Some(refresh_token.to_string()));

        self.store(credentials).await
    }

    /// Generate the authorization URL for a given redirect target
    pub fn authorization_url(&self, redirect_uri: &str) -> String {
        let scopes = self.config.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.keys.auth_uri,
            urlencoding::encode(&self.keys.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes)
        )
    }

    /// Exchange authorization code for tokens
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<StoredCredentials> {
        let params = [
            ("client_id", self.keys.client_id.as_str()),
            ("client_secret", self.keys.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http_client
            .post(&self.keys.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Auth(AuthError::TokenExchangeFailed {
                message: text,
            }));
        }

        let token_response: TokenResponse = response.json().await?;
        self.store(StoredCredentials::from_response(token_response, None))
            .await
    }

    /// Run interactive authentication flow with local HTTP server
    pub async fn authenticate_interactive(&self) -> Result<StoredCredentials> {
        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], self.config.oauth_callback_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}{}", port, CALLBACK_PATH);

        let auth_url = self.authorization_url(&redirect_uri);
        eprintln!("\nPlease visit this URL to authenticate:");
        eprintln!("{}\n", auth_url);

        if let Err(e) = open::that(&auth_url) {
            eprintln!("Could not open browser automatically: {}", e);
            eprintln!("Please open the URL manually.");
        }

        let (tx, rx) = oneshot::channel();
        let app = callback_router(tx);

        tracing::info!("Waiting for authentication callback on port {}", port);

        tokio::select! {
            result = axum::serve(listener, app) => {
                let message = match result {
                    Ok(()) => "callback server stopped".to_string(),
                    Err(e) => e.to_string(),
                };
                Err(AdapterError::Auth(AuthError::CallbackError { message }))
            }
            outcome = rx => {
                match outcome {
                    Ok(Ok(code)) => {
                        tracing::info!("Received authorization code, exchanging for tokens");
                        self.exchange_code(&code, &redirect_uri).await
                    }
                    Ok(Err(reason)) => Err(AdapterError::Auth(AuthError::ConsentDenied { reason })),
                    Err(_) => Err(AdapterError::Auth(AuthError::NoAuthCode)),
                }
            }
        }
    }
}

#[async_trait]
impl TokenProvider for Authenticator {
    async fn access_token(&self) -> Result<String> {
        self.get_access_token().await
    }
}

/// Outcome delivered by the callback: the code, or the provider's error
type CallbackOutcome = std::result::Result<String, String>;

/// Router answering the consent redirect and forwarding the first outcome
pub fn callback_router(tx: oneshot::Sender<CallbackOutcome>) -> Router {
    let tx = Arc::new(Mutex::new(Some(tx)));

    let handler = move |Query(params): Query<HashMap<String, String>>| {
        let tx = tx.clone();
        async move {
            let (outcome, page) = match (params.get("code"), params.get("error")) {
                (Some(code), _) => (
                    Ok(code.clone()),
                    "<html><body><h1>Authentication successful!</h1><p>You can close this window.</p></body></html>",
                ),
                (None, Some(error)) => (
                    Err(error.clone()),
                    "<html><body><h1>Authentication failed</h1><p>Consent was not granted.</p></body></html>",
                ),
                (None, None) => {
                    return Html("<html><body><h1>Authentication failed</h1><p>No authorization code received.</p></body></html>");
                }
            };

            if let Some(tx) = tx.lock().await.take() {
                let _ = tx.send(outcome);
            }
            Html(page)
        }
    };

    Router::new().route(CALLBACK_PATH, get(handler))
}
