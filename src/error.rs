use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Message used when a failed response carries no parseable error object.
pub const MALFORMED_REQUEST: &str = "malformed request sent";

#[derive(Error, Debug)]
pub enum Error {
    /// Any non-2xx/3xx answer from the Web API.
    #[error("bad request ({status}): {message}")]
    BadRequest {
        status: u16,
        message: String,
        reason: Option<String>,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The accounts service rejected the credentials or grant.
    #[error("authentication failed: {error}{}", describe(.description))]
    Authentication {
        error: String,
        description: Option<String>,
    },

    #[error("rate limited, retry after {} seconds", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("the access token expired and cannot be refreshed, re-authentication is needed")]
    ReAuthenticationNeeded,

    #[error("request did not finish within {0:?}")]
    Timeout(Duration),

    #[error("unexpected response body: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Status code of a `BadRequest`, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::BadRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds a `BadRequest` from the body of a failed Web API response.
    ///
    /// When the body is not a `{"error": {...}}` object the message falls back
    /// to [`MALFORMED_REQUEST`] and the decode failure is kept as the source.
    pub(crate) fn from_error_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => Error::BadRequest {
                status,
                message: parsed.error.message,
                reason: parsed.error.reason,
                source: None,
            },
            Err(e) => Error::BadRequest {
                status,
                message: MALFORMED_REQUEST.to_string(),
                reason: None,
                source: Some(e),
            },
        }
    }

    /// Builds an `Authentication` error from an accounts service response.
    pub(crate) fn from_auth_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<AuthenticationErrorResponse>(body) {
            Ok(parsed) => Error::Authentication {
                error: parsed.error,
                description: parsed.error_description,
            },
            Err(_) => Error::Authentication {
                error: format!("token endpoint answered {status}"),
                description: None,
            },
        }
    }

    pub(crate) fn parse(source: serde_json::Error, body: impl Into<String>) -> Self {
        Error::Parse {
            source,
            body: body.into(),
        }
    }
}

fn describe(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorObject {
    pub status: u16,
    pub message: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}
