use std::collections::HashMap;

use axum::{Extension, extract::Query, response::Html};
use tracing::warn;

use crate::{auth::flows, server::CallbackContext};

/// Handles the redirect from the authorization page.
///
/// Rejects answers whose `state` does not match the session, records
/// `error=access_denied` style answers, and otherwise exchanges the code for a
/// token using the session's code verifier.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(context): Extension<CallbackContext>,
) -> Html<&'static str> {
    let mut guard = context.session.lock().await;
    let Some(session) = guard.as_mut() else {
        return Html("<h4>No login in progress.</h4>");
    };

    if params.get("state") != Some(&session.state) {
        return Html("<h4>State mismatch, ignoring this callback.</h4>");
    }

    if let Some(error) = params.get("error") {
        session.error = Some(error.clone());
        return Html("<h4>Login was not granted.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match flows::exchange_pkce_code(
        &context.http,
        &context.options,
        &context.credentials,
        code,
        &session.code_verifier,
    )
    .await
    {
        Ok(token) => {
            session.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this window.</p>")
        }
        Err(e) => {
            warn!(error = %e, "token exchange failed");
            session.error = Some(e.to_string());
            Html("<h4>Login failed.</h4>")
        }
    }
}
