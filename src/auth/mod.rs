//! Tokens, scopes and the OAuth 2.0 flows that mint them.
//!
//! Supported grants:
//!
//! - **Client credentials**: app-only access, refreshed by re-running the grant.
//! - **Authorization code**: user access for clients that can keep a secret.
//! - **PKCE**: user access without a client secret; the code verifier proves
//!   the same client started and finished the flow.
//! - **Implicit grant**: short-lived user token from the redirect fragment,
//!   cannot be refreshed.

pub mod flows;
pub mod pkce;
mod scope;
mod store;
mod token;

pub use scope::{Scope, parse_scope_list};
pub use store::TokenStore;
pub use token::{REFRESH_MARGIN_SECS, Token, TokenResponse};
