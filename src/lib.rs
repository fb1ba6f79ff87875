//! Typed client for the Spotify Web API with a resilient request pipeline.
//!
//! Every call made through an endpoint family runs the same chain: the token
//! is refreshed when it is about to expire, cached responses are served or
//! revalidated with their `ETag`, 5xx and 429 answers are retried once, and a
//! rejected access token triggers a single refresh. Results come back as
//! typed models or paging objects that can walk to adjacent pages.
//!
//! # Modules
//!
//! - `api` - `SpotifyApi` and the app/client wrappers holding token and cache
//! - `auth` - tokens, scopes, OAuth flows and token persistence
//! - `cache` - response cache keyed by request, partitioned per endpoint
//! - `config` - library options, credentials and environment variables
//! - `endpoint` - request orchestration shared by every endpoint family
//! - `endpoints` - typed endpoint families (albums, search, player, ...)
//! - `http` - request values and the single-request executor
//! - `models` - Web API object models
//! - `paging` - offset and cursor based pages
//! - `cli`, `server` - the `spotapi` command line tool and its login callback
//!
//! # Example
//!
//! ```no_run
//! use spotapi::{ApiOptions, Credentials, SpotifyAppApi};
//!
//! # async fn run() -> spotapi::Result<()> {
//! let credentials = Credentials::new("client-id").with_secret("client-secret");
//! let api = SpotifyAppApi::from_client_credentials(credentials, ApiOptions::default()).await?;
//! let album = api.albums().album("4aawyAB9vmqN3uQ7FjRGTy", None).await?;
//! println!("{}", album.name);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod endpoint;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod models;
pub mod paging;
pub mod server;

pub use api::{Grant, SpotifyApi, SpotifyAppApi, SpotifyClientApi};
pub use config::{ApiOptions, Credentials};
pub use error::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Prints a user facing status line with a blue bullet point.
///
/// Used by the command line tool only; library code logs through `tracing`.
///
/// ```ignore
/// info!("Opening the browser for login...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line to stderr and exits with status 1.
///
/// Only for failures the command cannot continue from.
///
/// # Example
///
/// ```ignore
/// error!("Missing required environment variable: {}", name);
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line with a yellow exclamation mark. Execution continues.
///
/// # Example
///
/// ```ignore
/// warning!("No stored token found, run `spotapi auth` first");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
