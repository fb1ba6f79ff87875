use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    ApiOptions, Credentials, Error, Result,
    auth::{TokenStore, flows, parse_scope_list, pkce},
    config, info,
    server::{self, CallbackContext, PkceSession, SharedSession},
    success, warning,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(120);

/// Runs the PKCE login and stores the resulting token.
///
/// Starts the callback server on `SERVER_ADDRESS`, opens the authorization
/// page in the browser and waits up to two minutes for the redirect. Scopes
/// come from `SPOTIFY_SCOPE`.
pub async fn auth() -> Result<()> {
    let mut credentials = Credentials::from_env()?;
    if credentials.redirect_uri.is_none() {
        credentials.redirect_uri = Some(config::spotify_redirect_uri()?);
    }
    let scopes = parse_scope_list(&config::spotify_scope())?;
    let options = ApiOptions::default();

    let code_verifier = pkce::generate_code_verifier();
    let code_challenge = pkce::generate_code_challenge(&code_verifier);
    let state = pkce::generate_state();

    let session: SharedSession =
        Arc::new(Mutex::new(Some(PkceSession::new(code_verifier, state.clone()))));

    let context = CallbackContext {
        session: Arc::clone(&session),
        http: Client::new(),
        options: options.clone(),
        credentials: credentials.clone(),
    };
    let addr = config::server_addr()?;
    let server = tokio::spawn(async move { server::start_api_server(&addr, context).await });

    let auth_url = flows::pkce_authorization_url(
        &options,
        &credentials,
        &scopes,
        &code_challenge,
        Some(&state),
    )?;

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    }
    info!("Waiting for the login to complete...");

    let outcome = wait_for_session(&session, &server).await;
    server.abort();

    match outcome {
        Some(PkceSession {
            token: Some(token), ..
        }) => {
            let store = TokenStore::default_location();
            store.persist(&token).await?;
            success!("Authentication successful! Token stored in {}", store.path().display());
            Ok(())
        }
        Some(PkceSession {
            error: Some(error), ..
        }) => Err(Error::Authentication {
            error,
            description: None,
        }),
        _ => Err(Error::Timeout(LOGIN_TIMEOUT)),
    }
}

async fn wait_for_session(
    session: &SharedSession,
    server: &tokio::task::JoinHandle<Result<()>>,
) -> Option<PkceSession> {
    let started = tokio::time::Instant::now();

    while started.elapsed() < LOGIN_TIMEOUT {
        if let Some(current) = session.lock().await.as_ref() {
            if current.is_finished() {
                return Some(current.clone());
            }
        }
        if server.is_finished() {
            warning!("Callback server stopped before the login completed");
            return None;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}
