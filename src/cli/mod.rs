//! # CLI Module
//!
//! Commands of the `spotapi` binary. Each command loads the stored login,
//! talks to the Web API through [`SpotifyClientApi`] and prints the result as
//! a table.
//!
//! ## Commands
//!
//! - [`auth`] - PKCE login through the local callback server
//! - [`me`] - profile of the signed in user
//! - [`album`] - album details with its track list
//! - [`search`] - catalogue search
//! - [`followed`] - every followed artist, walking all cursor pages
//! - [`saved`] - saved tracks
//!
//! A refreshed token is written back to the token store when the command
//! finishes, so the next invocation starts with it.

mod album;
mod auth;
mod followed;
mod me;
mod saved;
mod search;
pub mod table;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::{
    ApiOptions, Credentials, Error, Result, SpotifyClientApi,
    auth::TokenStore,
};

pub use album::album;
pub use auth::auth;
pub use followed::followed;
pub use me::me;
pub use saved::saved;
pub use search::search;

/// A user api resumed from the token store.
pub struct Session {
    api: SpotifyClientApi,
    store: TokenStore,
    initial_access_token: String,
}

impl Session {
    pub async fn load() -> Result<Self> {
        let store = TokenStore::default_location();
        let token = match store.load().await {
            Ok(token) => token,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Config(
                    "no stored login found, run `spotapi auth` first".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        let credentials = Credentials::from_env()?;
        let initial_access_token = token.access_token.clone();
        let api = SpotifyClientApi::from_token(credentials, token, ApiOptions::default());

        Ok(Self {
            api,
            store,
            initial_access_token,
        })
    }

    pub fn api(&self) -> &SpotifyClientApi {
        &self.api
    }

    /// Persists the token if it was refreshed during the command.
    pub async fn finish(self) -> Result<()> {
        let token = self.api.token();
        if token.access_token != self.initial_access_token {
            debug!(path = %self.store.path().display(), "persisting refreshed token");
            self.store.persist(&token).await?;
        }
        Ok(())
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
