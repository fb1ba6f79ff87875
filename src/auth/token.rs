use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result, auth::Scope, http::expires_after};

/// Seconds before the real expiry at which a token is considered stale.
pub const REFRESH_MARGIN_SECS: i64 = 240;

/// Access credential as returned by the accounts service.
///
/// A token is never patched in place; a refresh produces a new value that
/// replaces the old one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scopes: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
}

/// Raw JSON body of a successful token exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

fn bearer() -> String {
    "Bearer".to_string()
}

fn default_expires_in() -> i64 {
    3600
}

impl Token {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in: i64,
        scopes: BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: bearer(),
            expires_in,
            refresh_token,
            scopes,
            expires_at: expires_after(now, expires_in),
        }
    }

    /// Builds a token from a token endpoint response received at `now`.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            refresh_token: response.refresh_token,
            scopes: parse_scopes(response.scope.as_deref().unwrap_or_default()),
            expires_at: expires_after(now, response.expires_in),
        }
    }

    /// Builds the successor of `self` from a refresh response.
    ///
    /// The accounts service does not always rotate refresh tokens, so a
    /// response without one keeps the current refresh token.
    pub fn refreshed(&self, response: TokenResponse, now: DateTime<Utc>) -> Self {
        let mut token = Token::from_response(response, now);
        if token.refresh_token.is_none() {
            token.refresh_token = self.refresh_token.clone();
        }
        if token.scopes.is_empty() {
            token.scopes = self.scopes.clone();
        }
        token
    }

    /// Parses the fragment of an implicit grant redirect, e.g.
    /// `https://host/cb#access_token=..&token_type=Bearer&expires_in=3600`.
    pub fn from_implicit_redirect(redirect: &str, now: DateTime<Utc>) -> Result<Self> {
        let url = Url::parse(redirect)
            .map_err(|e| Error::Config(format!("invalid redirect url: {e}")))?;
        let fragment = url.fragment().unwrap_or_default();

        let mut access_token = None;
        let mut token_type = bearer();
        let mut expires_in = default_expires_in();
        let mut scope = String::new();
        for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
            match key.as_ref() {
                "access_token" => access_token = Some(value.into_owned()),
                "token_type" => token_type = value.into_owned(),
                "expires_in" => expires_in = value.parse().unwrap_or(expires_in),
                "scope" => scope = value.into_owned(),
                "error" => {
                    return Err(Error::Authentication {
                        error: value.into_owned(),
                        description: None,
                    });
                }
                _ => {}
            }
        }

        let access_token = access_token.ok_or_else(|| Error::Authentication {
            error: "redirect carries no access_token".to_string(),
            description: None,
        })?;

        Ok(Self {
            access_token,
            token_type,
            expires_in,
            refresh_token: None,
            scopes: parse_scopes(&scope),
            expires_at: expires_after(now, expires_in),
        })
    }

    pub fn should_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(TimeDelta::seconds(REFRESH_MARGIN_SECS))
            .is_none_or(|stale_at| now >= stale_at)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn has_scopes(&self, scopes: &[Scope]) -> bool {
        scopes.iter().all(|s| self.scopes.contains(s.as_str()))
    }

    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

fn parse_scopes(raw: &str) -> BTreeSet<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
