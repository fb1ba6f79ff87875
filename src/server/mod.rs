//! Local HTTP server that receives the OAuth redirect during `spotapi auth`.
//!
//! The login command stores a [`PkceSession`] before opening the browser; the
//! `/callback` handler exchanges the returned code with the stored verifier and
//! leaves the token in the session for the command to pick up.

mod callback;
mod health;

use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use reqwest::Client;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::debug;

use crate::{
    Error, Result,
    auth::Token,
    config::{ApiOptions, Credentials},
};

pub use callback::callback;
pub use health::health;

/// State of one PKCE login attempt.
#[derive(Debug, Clone)]
pub struct PkceSession {
    pub code_verifier: String,
    pub state: String,
    pub token: Option<Token>,
    pub error: Option<String>,
}

impl PkceSession {
    pub fn new(code_verifier: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            code_verifier: code_verifier.into(),
            state: state.into(),
            token: None,
            error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.token.is_some() || self.error.is_some()
    }
}

pub type SharedSession = Arc<Mutex<Option<PkceSession>>>;

/// Everything the callback handler needs to finish the code exchange.
#[derive(Clone)]
pub struct CallbackContext {
    pub session: SharedSession,
    pub http: Client,
    pub options: ApiOptions,
    pub credentials: Credentials,
}

pub fn router(context: CallbackContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/callback", get(callback).layer(Extension(context)))
}

/// Binds `addr` and serves the callback router until the task is dropped.
pub async fn start_api_server(addr: &str, context: CallbackContext) -> Result<()> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("invalid server address {addr}: {e}")))?;

    let listener = TcpListener::bind(&addr).await?;
    debug!(%addr, "callback server listening");
    serve(listener, context).await
}

/// Serves the callback router on an already bound listener.
pub async fn serve(listener: TcpListener, context: CallbackContext) -> Result<()> {
    axum::serve(listener, router(context)).await?;
    Ok(())
}
