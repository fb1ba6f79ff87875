//! Aggregate roots holding the token, the response cache and the endpoint
//! families.
//!
//! [`SpotifyApi`] is cheap to clone; clones share token, cache and HTTP
//! client. [`SpotifyAppApi`] and [`SpotifyClientApi`] wrap it and only expose
//! the endpoints their kind of token may call.

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    Error, Result,
    auth::{Scope, Token, flows},
    cache::ResponseCache,
    config::{ApiOptions, Credentials},
    endpoints::{
        AlbumsApi, ArtistsApi, BrowseApi, ClientPlaylistsApi, ClientProfileApi, FollowingApi,
        LibraryApi, PersonalizationApi, PlayerApi, PlaylistsApi, SearchApi, TracksApi,
        UserProfileApi,
    },
    http::{RetryPolicy, TokenRefresher},
};

/// How the current token was obtained, which decides how it can be renewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Renewed by running the client credentials grant again.
    ClientCredentials,
    /// Authorization code or PKCE; renewed through the refresh token.
    UserAuthorization,
    /// Implicit grant or an externally supplied token; cannot be renewed.
    Static,
}

struct ApiInner {
    http: Client,
    options: ApiOptions,
    credentials: Credentials,
    grant: Grant,
    token: RwLock<Arc<Token>>,
    refresh_guard: Mutex<()>,
    cache: ResponseCache,
}

/// Shared core of every Spotify client.
///
/// Holds the credentials, the current [`Token`], the response cache and the
/// HTTP client. All endpoint families are built from it and run their calls
/// through [`Endpoint::execute`](crate::endpoint::Endpoint::execute), so they
/// share one token and one cache.
///
/// # Token Lifecycle
///
/// The token is swapped atomically on refresh. Requests already in flight
/// finish with the token they started with, and at most one refresh runs at a
/// time no matter how many requests notice the expiry together.
///
/// # Example
///
/// ```
/// let token = Token::new("BQC...", None, 3600, BTreeSet::new(), Utc::now());
/// let api = SpotifyApi::new(Credentials::new("client-id"), token, Grant::Static, ApiOptions::default());
/// let album = api.albums().album("4aawyAB9vmqN3uQ7FjRGTy", None).await?;
/// ```
#[derive(Clone)]
pub struct SpotifyApi {
    inner: Arc<ApiInner>,
}

impl SpotifyApi {
    /// Builds an api around an already obtained token.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id and optional secret, used when refreshing
    /// * `token` - Initial access token
    /// * `grant` - How `token` was obtained; decides how it can be renewed
    /// * `options` - Cache, retry and refresh behaviour
    ///
    /// # Returns
    ///
    /// A client with its own `reqwest::Client` and an empty response cache.
    pub fn new(credentials: Credentials, token: Token, grant: Grant, options: ApiOptions) -> Self {
        Self::with_client(Client::new(), credentials, token, grant, options)
    }

    /// Like [`SpotifyApi::new`] with a caller configured `reqwest::Client`.
    pub fn with_client(
        http: Client,
        credentials: Credentials,
        token: Token,
        grant: Grant,
        options: ApiOptions,
    ) -> Self {
        let cache = ResponseCache::new(options.use_cache, options.cache_limit);
        Self {
            inner: Arc::new(ApiInner {
                http,
                options,
                credentials,
                grant,
                token: RwLock::new(Arc::new(token)),
                refresh_guard: Mutex::new(()),
                cache,
            }),
        }
    }

    pub fn options(&self) -> &ApiOptions {
        &self.inner.options
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn grant(&self) -> Grant {
        self.inner.grant
    }

    /// Response cache shared by every endpoint family of this api.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Snapshot of the current token.
    pub fn token(&self) -> Arc<Token> {
        self.inner.token.read().clone()
    }

    /// Replaces the token. Requests already in flight keep the old one.
    pub fn set_token(&self, token: Token) {
        *self.inner.token.write() = Arc::new(token);
    }

    /// Whether the current token can be renewed without user interaction.
    ///
    /// Client credentials tokens always can, user tokens only while they carry a
    /// refresh token, implicit and external tokens never.
    pub fn can_refresh(&self) -> bool {
        match self.inner.grant {
            Grant::ClientCredentials => true,
            Grant::UserAuthorization => self.token().refresh_token.is_some(),
            Grant::Static => false,
        }
    }

    /// Checks whether the current token was granted all of `scopes`.
    pub fn has_scopes(&self, scopes: &[Scope]) -> bool {
        self.token().has_scopes(scopes)
    }

    pub(crate) fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            server_error: self.inner.options.retry_on_server_error,
            rate_limited: self.inner.options.retry_when_rate_limited,
            unauthorized: self.inner.options.automatic_refresh && self.can_refresh(),
        }
    }

    /// Forces a refresh of the current token, regardless of its expiry.
    ///
    /// A refresh already running for the same token is joined instead of
    /// starting a second one. The `on_token_refresh` hook from [`ApiOptions`]
    /// sees the new token before this returns.
    ///
    /// # Returns
    ///
    /// The token now installed on the api.
    ///
    /// # Errors
    ///
    /// - [`Error::ReAuthenticationNeeded`] for implicit or external tokens
    /// - [`Error::Authentication`] when the accounts service rejects the
    ///   credentials or the refresh token
    /// - [`Error::Http`] on network failures
    pub async fn refresh_token(&self) -> Result<Arc<Token>> {
        let observed = self.token();
        self.refresh_from(&observed.access_token).await
    }

    /// Current token, refreshed first if it is about to expire.
    ///
    /// Fails with [`Error::ReAuthenticationNeeded`] when it is stale and cannot be
    /// refreshed automatically.
    pub(crate) async fn fresh_token(&self) -> Result<Arc<Token>> {
        let token = self.token();
        if !token.should_refresh(Utc::now()) {
            return Ok(token);
        }
        if !self.inner.options.automatic_refresh || !self.can_refresh() {
            return Err(Error::ReAuthenticationNeeded);
        }
        self.refresh_from(&token.access_token).await
    }

    /// Refreshes unless the token was already replaced since the caller saw
    /// `observed`. At most one refresh runs at a time.
    async fn refresh_from(&self, observed: &str) -> Result<Arc<Token>> {
        let _guard = self.inner.refresh_guard.lock().await;

        let current = self.token();
        if current.access_token != observed {
            debug!("token already refreshed by a concurrent request");
            return Ok(current);
        }

        let inner = &self.inner;
        let fresh = match inner.grant {
            Grant::ClientCredentials => {
                flows::client_credentials(&inner.http, &inner.options, &inner.credentials).await?
            }
            Grant::UserAuthorization => {
                flows::refresh(&inner.http, &inner.options, &inner.credentials, &current).await?
            }
            Grant::Static => return Err(Error::ReAuthenticationNeeded),
        };

        let fresh = Arc::new(fresh);
        *inner.token.write() = Arc::clone(&fresh);
        info!(expires_at = %fresh.expires_at, "access token refreshed");

        if let Some(hook) = &inner.options.on_token_refresh {
            hook(&fresh);
        }
        Ok(fresh)
    }

    /// Album lookups and album tracks.
    pub fn albums(&self) -> AlbumsApi {
        AlbumsApi::new(self.clone())
    }

    /// Artists, their releases, top tracks and related artists.
    pub fn artists(&self) -> ArtistsApi {
        ArtistsApi::new(self.clone())
    }

    pub fn tracks(&self) -> TracksApi {
        TracksApi::new(self.clone())
    }

    /// New releases, categories, featured playlists and markets.
    pub fn browse(&self) -> BrowseApi {
        BrowseApi::new(self.clone())
    }

    /// Catalogue search.
    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.clone())
    }

    /// Read access to playlists by id or owner.
    pub fn playlists(&self) -> PlaylistsApi {
        PlaylistsApi::new(self.clone())
    }

    /// Public user profiles.
    pub fn users(&self) -> UserProfileApi {
        UserProfileApi::new(self.clone())
    }
}

#[async_trait]
impl TokenRefresher for SpotifyApi {
    async fn refresh_authorization(&self, rejected: Option<&str>) -> Result<String> {
        let observed = match rejected.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(access_token) => access_token.to_string(),
            None => self.token().access_token.clone(),
        };
        let token = self.refresh_from(&observed).await?;
        Ok(token.authorization_header())
    }
}

/// Api for app-only (client credentials) access.
#[derive(Clone)]
pub struct SpotifyAppApi {
    api: SpotifyApi,
}

impl SpotifyAppApi {
    /// Runs the client credentials grant and builds the api around its token.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id and secret; the secret is required
    /// * `options` - Api options; `accounts_base_url` decides where the grant runs
    ///
    /// # Returns
    ///
    /// An app api whose token is renewed by repeating the grant.
    ///
    /// # Errors
    ///
    /// - [`Error::Authentication`] if the accounts service rejects the client
    /// - [`Error::Config`] if `credentials` carries no secret
    /// - [`Error::Http`] on network failures
    pub async fn from_client_credentials(
        credentials: Credentials,
        options: ApiOptions,
    ) -> Result<Self> {
        let http = Client::new();
        let token = flows::client_credentials(&http, &options, &credentials).await?;
        Ok(Self {
            api: SpotifyApi::with_client(
                http,
                credentials,
                token,
                Grant::ClientCredentials,
                options,
            ),
        })
    }

    /// Wraps a client credentials token obtained elsewhere.
    pub fn from_token(credentials: Credentials, token: Token, options: ApiOptions) -> Self {
        Self {
            api: SpotifyApi::new(credentials, token, Grant::ClientCredentials, options),
        }
    }

    pub fn into_inner(self) -> SpotifyApi {
        self.api
    }
}

impl Deref for SpotifyAppApi {
    type Target = SpotifyApi;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

/// Api acting on behalf of a user (authorization code, PKCE or implicit grant).
#[derive(Clone)]
pub struct SpotifyClientApi {
    api: SpotifyApi,
}

impl SpotifyClientApi {
    /// Exchanges an authorization code for a user token.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id, secret and the redirect URI sent to
    ///   `/authorize`
    /// * `code` - The `code` query parameter of the redirect
    /// * `options` - Api options
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] when the code is invalid or expired,
    /// [`Error::Config`] without a secret or redirect URI.
    pub async fn from_authorization_code(
        credentials: Credentials,
        code: &str,
        options: ApiOptions,
    ) -> Result<Self> {
        let http = Client::new();
        let token =
            flows::exchange_authorization_code(&http, &options, &credentials, code).await?;
        Ok(Self::assemble(http, credentials, token, Grant::UserAuthorization, options))
    }

    /// Exchanges a PKCE authorization code for a user token.
    ///
    /// No client secret is needed. Refreshes later send the client id in the
    /// request body instead.
    ///
    /// # Arguments
    ///
    /// * `credentials` - Client id of the app
    /// * `code` - The `code` query parameter of the redirect
    /// * `code_verifier` - The verifier whose challenge was sent to `/authorize`
    /// * `options` - Api options
    ///
    /// # Errors
    ///
    /// [`Error::Authentication`] when the code or verifier is rejected.
    pub async fn from_pkce_code(
        credentials: Credentials,
        code: &str,
        code_verifier: &str,
        options: ApiOptions,
    ) -> Result<Self> {
        let http = Client::new();
        let token =
            flows::exchange_pkce_code(&http, &options, &credentials, code, code_verifier).await?;
        Ok(Self::assemble(http, credentials, token, Grant::UserAuthorization, options))
    }

    /// Resumes a user session from a previously obtained token.
    pub fn from_token(credentials: Credentials, token: Token, options: ApiOptions) -> Self {
        Self::assemble(
            Client::new(),
            credentials,
            token,
            Grant::UserAuthorization,
            options,
        )
    }

    /// Wraps an implicit grant token. It cannot be refreshed.
    pub fn from_implicit_token(credentials: Credentials, token: Token, options: ApiOptions) -> Self {
        Self::assemble(Client::new(), credentials, token, Grant::Static, options)
    }

    fn assemble(
        http: Client,
        credentials: Credentials,
        token: Token,
        grant: Grant,
        options: ApiOptions,
    ) -> Self {
        Self {
            api: SpotifyApi::with_client(http, credentials, token, grant, options),
        }
    }

    pub fn into_inner(self) -> SpotifyApi {
        self.api
    }

    /// Followed artists.
    pub fn following(&self) -> FollowingApi {
        FollowingApi::new(self.api.clone())
    }

    /// Saved tracks.
    pub fn library(&self) -> LibraryApi {
        LibraryApi::new(self.api.clone())
    }

    /// Playback state and control.
    pub fn player(&self) -> PlayerApi {
        PlayerApi::new(self.api.clone())
    }

    pub fn personalization(&self) -> PersonalizationApi {
        PersonalizationApi::new(self.api.clone())
    }

    /// Playlists of the signed in user, including writes.
    pub fn client_playlists(&self) -> ClientPlaylistsApi {
        ClientPlaylistsApi::new(self.api.clone())
    }

    /// Profile of the signed in user.
    pub fn profile(&self) -> ClientProfileApi {
        ClientProfileApi::new(self.api.clone())
    }
}

impl Deref for SpotifyClientApi {
    type Target = SpotifyApi;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}
