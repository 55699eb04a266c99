//! Credential lifecycle: storage and the OAuth1 handshake.
//!
//! - `credentials`: The token set and where it is persisted
//! - `oauth`: Request signing, first-time registration and token refresh

pub mod credentials;
pub mod oauth;

use async_trait::async_trait;

use crate::{yahoo::http::HttpRequest, Result};

pub use credentials::{CredentialStore, Credentials, JsonCredentialStore, MemoryCredentialStore};
pub use oauth::{OAuth1, OAuthEndpoints, VerifierPrompt};

/// What the API handle needs from an authentication scheme.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Attach authentication to an outgoing API request.
    fn sign(&self, request: HttpRequest, credentials: &Credentials) -> Result<HttpRequest>;

    /// Full first-time flow. May need out-of-band user action.
    async fn register(&self, credentials: &Credentials) -> Result<Credentials>;

    /// Exchange the session handle for a fresh access token. Non-interactive.
    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials>;
}
