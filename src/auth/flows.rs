//! OAuth 2.0 grant flows against the accounts service.
//!
//! Authorization URLs are built locally; code and credential exchanges POST
//! `application/x-www-form-urlencoded` bodies to the token endpoint through
//! the same [`HttpConnection`] the Web API calls use (without token refresh).

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{
    Error, Result,
    auth::{Scope, Token, TokenResponse},
    config::{ApiOptions, Credentials},
    http::{HttpConnection, HttpMethod, HttpRequest, RequestBody, RetryPolicy},
};

/// URL the user opens to grant an authorization code.
pub fn authorization_url(
    options: &ApiOptions,
    credentials: &Credentials,
    scopes: &[Scope],
    state: Option<&str>,
    show_dialog: bool,
) -> Result<String> {
    let mut params = base_authorize_params(credentials, "code", scopes)?;
    push_state(&mut params, state);
    if show_dialog {
        params.push(("show_dialog", "true".to_string()));
    }
    build_url(&options.authorize_url(), &params)
}

/// Authorization URL for the PKCE flow; `code_challenge` comes from
/// [`crate::auth::pkce::generate_code_challenge`].
pub fn pkce_authorization_url(
    options: &ApiOptions,
    credentials: &Credentials,
    scopes: &[Scope],
    code_challenge: &str,
    state: Option<&str>,
) -> Result<String> {
    let mut params = base_authorize_params(credentials, "code", scopes)?;
    params.push(("code_challenge_method", "S256".to_string()));
    params.push(("code_challenge", code_challenge.to_string()));
    push_state(&mut params, state);
    build_url(&options.authorize_url(), &params)
}

/// Authorization URL for the implicit grant. The token comes back in the
/// redirect fragment, see [`Token::from_implicit_redirect`].
pub fn implicit_grant_url(
    options: &ApiOptions,
    credentials: &Credentials,
    scopes: &[Scope],
    state: Option<&str>,
    show_dialog: bool,
) -> Result<String> {
    let mut params = base_authorize_params(credentials, "token", scopes)?;
    push_state(&mut params, state);
    if show_dialog {
        params.push(("show_dialog", "true".to_string()));
    }
    build_url(&options.authorize_url(), &params)
}

pub async fn client_credentials(
    http: &Client,
    options: &ApiOptions,
    credentials: &Credentials,
) -> Result<Token> {
    let response = token_request(
        http,
        options,
        credentials,
        vec![("grant_type", "client_credentials".to_string())],
        true,
    )
    .await?;
    Ok(Token::from_response(response, Utc::now()))
}

pub async fn exchange_authorization_code(
    http: &Client,
    options: &ApiOptions,
    credentials: &Credentials,
    code: &str,
) -> Result<Token> {
    let form = vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("redirect_uri", credentials.redirect_uri()?.to_string()),
    ];
    let response = token_request(http, options, credentials, form, true).await?;
    Ok(Token::from_response(response, Utc::now()))
}

pub async fn exchange_pkce_code(
    http: &Client,
    options: &ApiOptions,
    credentials: &Credentials,
    code: &str,
    code_verifier: &str,
) -> Result<Token> {
    let form = vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.to_string()),
        ("redirect_uri", credentials.redirect_uri()?.to_string()),
        ("client_id", credentials.client_id.clone()),
        ("code_verifier", code_verifier.to_string()),
    ];
    let response = token_request(http, options, credentials, form, false).await?;
    Ok(Token::from_response(response, Utc::now()))
}

/// Exchanges the refresh token of `token` for a new access token.
///
/// Confidential clients authenticate with their secret; PKCE clients send
/// their client id in the body instead.
pub async fn refresh(
    http: &Client,
    options: &ApiOptions,
    credentials: &Credentials,
    token: &Token,
) -> Result<Token> {
    let refresh_token = token
        .refresh_token
        .as_deref()
        .ok_or(Error::ReAuthenticationNeeded)?;

    let confidential = credentials.client_secret.is_some();
    let mut form = vec![
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
    ];
    if !confidential {
        form.push(("client_id", credentials.client_id.clone()));
    }

    let response = token_request(http, options, credentials, form, confidential).await?;
    Ok(token.refreshed(response, Utc::now()))
}

async fn token_request(
    http: &Client,
    options: &ApiOptions,
    credentials: &Credentials,
    form: Vec<(&str, String)>,
    basic_auth: bool,
) -> Result<TokenResponse> {
    let grant_type = form
        .iter()
        .find(|(k, _)| *k == "grant_type")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    debug!(grant_type = %grant_type, "requesting token");

    let request = HttpRequest::new(HttpMethod::Post, options.token_url())
        .with_body(RequestBody::form(form));
    let policy = RetryPolicy {
        server_error: options.retry_on_server_error,
        rate_limited: options.retry_when_rate_limited,
        unauthorized: false,
    };

    let basic = if basic_auth {
        Some(basic_authorization(credentials)?)
    } else {
        None
    };
    let mut headers = Vec::new();
    if let Some(value) = basic.as_deref() {
        headers.push(("Authorization", value));
    }

    let response = HttpConnection::new(http, &request)
        .policy(policy)
        .execute(&headers)
        .await?;

    if !(200..300).contains(&response.status) {
        return Err(Error::from_auth_body(response.status, &response.body));
    }

    serde_json::from_str(&response.body).map_err(|e| Error::parse(e, response.body.clone()))
}

fn basic_authorization(credentials: &Credentials) -> Result<String> {
    let secret = credentials.client_secret.as_deref().ok_or_else(|| {
        Error::Config("a client secret is required for this flow".to_string())
    })?;
    let encoded = STANDARD.encode(format!("{}:{}", credentials.client_id, secret));
    Ok(format!("Basic {encoded}"))
}

fn base_authorize_params(
    credentials: &Credentials,
    response_type: &str,
    scopes: &[Scope],
) -> Result<Vec<(&'static str, String)>> {
    let mut params = vec![
        ("client_id", credentials.client_id.clone()),
        ("response_type", response_type.to_string()),
        ("redirect_uri", credentials.redirect_uri()?.to_string()),
    ];
    if !scopes.is_empty() {
        params.push(("scope", Scope::join(scopes)));
    }
    Ok(params)
}

fn push_state(params: &mut Vec<(&'static str, String)>, state: Option<&str>) {
    if let Some(state) = state {
        params.push(("state", state.to_string()));
    }
}

fn build_url(base: &str, params: &[(&'static str, String)]) -> Result<String> {
    Url::parse_with_params(base, params.iter().map(|(k, v)| (*k, v.as_str())))
        .map(String::from)
        .map_err(|e| Error::Config(format!("invalid accounts url {base}: {e}")))
}
