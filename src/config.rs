//! Configuration for the client library and the command line tool.
//!
//! The library is configured through [`ApiOptions`] and [`Credentials`]. The
//! binary additionally reads its settings from environment variables, which
//! can be provided by a `.env` file in the local data directory:
//!
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf, sync::Arc, time::Duration};

use crate::{Error, Result, auth::Token};

/// Base URL of the Web API.
pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Base URL of the accounts service (authorization and token exchange).
pub const SPOTIFY_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Directory name used below the platform data directory.
pub const APP_DIR: &str = "spotapi";

/// Called with the new token after every successful refresh.
pub type TokenRefreshHook = Arc<dyn Fn(&Token) + Send + Sync>;

/// Behaviour switches for a [`crate::SpotifyApi`] instance.
#[derive(Clone)]
pub struct ApiOptions {
    /// Cache responses that carry a `Cache-Control` header.
    pub use_cache: bool,
    /// Upper bound on cached responses across all endpoints. `None` is unbounded.
    pub cache_limit: Option<usize>,
    /// Refresh expired tokens instead of failing with `ReAuthenticationNeeded`.
    pub automatic_refresh: bool,
    /// Wait out a 429 once instead of returning `RateLimited`.
    pub retry_when_rate_limited: bool,
    /// Retry a 5xx answer once.
    pub retry_on_server_error: bool,
    /// Retry a 202 answer once.
    pub retry_on_processing: bool,
    /// Deadline for a whole request chain, including refresh and retries.
    pub request_timeout: Option<Duration>,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub on_token_refresh: Option<TokenRefreshHook>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            cache_limit: Some(200),
            automatic_refresh: true,
            retry_when_rate_limited: true,
            retry_on_server_error: true,
            retry_on_processing: true,
            request_timeout: None,
            api_base_url: SPOTIFY_API_BASE_URL.to_string(),
            accounts_base_url: SPOTIFY_ACCOUNTS_BASE_URL.to_string(),
            on_token_refresh: None,
        }
    }
}

impl fmt::Debug for ApiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiOptions")
            .field("use_cache", &self.use_cache)
            .field("cache_limit", &self.cache_limit)
            .field("automatic_refresh", &self.automatic_refresh)
            .field("retry_when_rate_limited", &self.retry_when_rate_limited)
            .field("retry_on_server_error", &self.retry_on_server_error)
            .field("retry_on_processing", &self.retry_on_processing)
            .field("request_timeout", &self.request_timeout)
            .field("api_base_url", &self.api_base_url)
            .field("accounts_base_url", &self.accounts_base_url)
            .field("on_token_refresh", &self.on_token_refresh.is_some())
            .finish()
    }
}

impl ApiOptions {
    /// Token endpoint derived from `accounts_base_url`.
    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base_url.trim_end_matches('/'))
    }

    /// Authorization endpoint derived from `accounts_base_url`.
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base_url.trim_end_matches('/'))
    }
}

/// Application credentials registered with the developer dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    /// Absent for PKCE and implicit grant clients.
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Reads `SPOTIFY_CLIENT_ID` and the optional `SPOTIFY_CLIENT_SECRET` and
    /// `SPOTIFY_REDIRECT_URI` from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: optional_var("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: optional_var("SPOTIFY_REDIRECT_URI"),
        })
    }

    pub(crate) fn redirect_uri(&self) -> Result<&str> {
        self.redirect_uri
            .as_deref()
            .ok_or_else(|| Error::Config("a redirect uri is required for this flow".to_string()))
    }
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the `spotapi` directory below the platform data directory if it
/// does not exist yet. A missing `.env` file is not an error, the process
/// environment is used as is.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotapi/.env`
/// - macOS: `~/Library/Application Support/spotapi/.env`
/// - Windows: `%LOCALAPPDATA%/spotapi/.env`
pub async fn load_env() -> Result<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Config(format!(
            "cannot read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Platform data directory for this application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Address the local OAuth callback server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> Result<String> {
    required_var("SERVER_ADDRESS")
}

/// Client id of the registered application (`SPOTIFY_CLIENT_ID`).
pub fn spotify_client_id() -> Result<String> {
    required_var("SPOTIFY_CLIENT_ID")
}

/// Redirect URI registered for the application (`SPOTIFY_REDIRECT_URI`).
pub fn spotify_redirect_uri() -> Result<String> {
    required_var("SPOTIFY_REDIRECT_URI")
}

/// Space separated scopes requested during login (`SPOTIFY_SCOPE`).
pub fn spotify_scope() -> String {
    optional_var("SPOTIFY_SCOPE").unwrap_or_default()
}

fn required_var(name: &str) -> Result<String> {
    optional_var(name).ok_or_else(|| Error::Config(format!("{name} must be set")))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
