//! OAuth1 with PLAINTEXT signatures over HTTPS.
//!
//! Registration is the three-legged flow: request token, user authorization
//! (the user opens a URL and reads back a PIN), access token. Afterwards the
//! access token is renewed with the session handle and no user involvement.

use async_trait::async_trait;
use rand::{distr::Alphanumeric, Rng};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use super::{Authorizer, Credentials};
use crate::{
    yahoo::http::{HttpRequest, HttpResponse, Transport},
    Result, YahooError,
};


pub const REQUEST_TOKEN_URL: &str = "https://api.login.yahoo.com/oauth/v2/get_request_token";
pub const AUTHORIZATION_URL: &str = "https://api.login.yahoo.com/oauth/v2/request_auth";
pub const GET_TOKEN_URL: &str = "https://api.login.yahoo.com/oauth/v2/get_token";
/// Out-of-band callback: the user copies a PIN instead of being redirected.
pub const CALLBACK_URL: &str = "oob";

const NONCE_LENGTH: usize = 16;

/// Supplies the verifier PIN once the user has visited the authorization URL.
pub trait VerifierPrompt: Send + Sync {
    fn verifier(&self, authorize_url: &Url) -> Result<String>;
}

impl<F> VerifierPrompt for F
where
    F: Fn(&Url) -> Result<String> + Send + Sync,
{
    fn verifier(&self, authorize_url: &Url) -> Result<String> {
        self(authorize_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub request_token: Url,
    pub authorization: Url,
    pub get_token: Url,
}

impl OAuthEndpoints {
    pub fn yahoo() -> Result<Self> {
        Ok(Self {
            request_token: Url::parse(REQUEST_TOKEN_URL)?,
            authorization: Url::parse(AUTHORIZATION_URL)?,
            get_token: Url::parse(GET_TOKEN_URL)?,
        })
    }

    /// Same paths as the real login service, rooted somewhere else.
    pub fn with_base(base: &Url) -> Result<Self> {
        Ok(Self {
            request_token: base.join("/oauth/v2/get_request_token")?,
            authorization: base.join("/oauth/v2/request_auth")?,
            get_token: base.join("/oauth/v2/get_token")?,
        })
    }
}

/// RFC 3986 percent-encoding as OAuth1 requires it.
pub fn percent_encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

fn nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

/// `OAuth k="v", ..` with a PLAINTEXT signature of `consumer_secret&token_secret`.
fn authorization_header(
    credentials: &Credentials,
    token: Option<(&str, &str)>,
    extra: &[(&str, &str)],
) -> Result<HeaderValue> {
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let nonce = nonce();
    let token_secret = token.map(|(_, secret)| secret).unwrap_or_default();
    let signature = format!(
        "{}&{}",
        percent_encode(&credentials.consumer_secret),
        percent_encode(token_secret)
    );

    let mut params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", credentials.consumer_key.as_str()),
        ("oauth_nonce", nonce.as_str()),
        ("oauth_signature_method", "PLAINTEXT"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_version", "1.0"),
    ];
    if let Some((token, _)) = token {
        params.push(("oauth_token", token));
    }
    params.extend_from_slice(extra);
    params.push(("oauth_signature", signature.as_str()));

    let header = params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(HeaderValue::from_str(&format!("OAuth {header}"))?)
}

fn parse_token_response(stage: &str, response: HttpResponse) -> Result<HashMap<String, String>> {
    if !response.is_success() {
        return Err(YahooError::OAuth {
            message: format!("{stage} returned {}: {}", response.status, response.body),
        });
    }
    Ok(form_urlencoded::parse(response.body.trim().as_bytes())
        .into_owned()
        .collect())
}

fn take(params: &mut HashMap<String, String>, stage: &str, key: &str) -> Result<String> {
    params.remove(key).ok_or_else(|| YahooError::OAuth {
        message: format!("{stage} response has no `{key}`"),
    })
}

/// OAuth1 [`Authorizer`] for the Yahoo login service.
pub struct OAuth1 {
    transport: Arc<dyn Transport>,
    prompt: Arc<dyn VerifierPrompt>,
    endpoints: OAuthEndpoints,
}

impl fmt::Debug for OAuth1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl OAuth1 {
    pub fn new(transport: Arc<dyn Transport>, prompt: Arc<dyn VerifierPrompt>) -> Result<Self> {
        Ok(Self::with_endpoints(transport, prompt, OAuthEndpoints::yahoo()?))
    }

    pub fn with_endpoints(
        transport: Arc<dyn Transport>,
        prompt: Arc<dyn VerifierPrompt>,
        endpoints: OAuthEndpoints,
    ) -> Self {
        Self {
            transport,
            prompt,
            endpoints,
        }
    }

    /// Where the user goes to approve a request token.
    pub fn authorize_url(&self, request_token: &str) -> Url {
        let mut url = self.endpoints.authorization.clone();
        url.query_pairs_mut().append_pair("oauth_token", request_token);
        url
    }

    async fn post_token_request(
        &self,
        url: &Url,
        credentials: &Credentials,
        token: Option<(&str, &str)>,
        extra: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let request = HttpRequest::post(url.clone()).header(
            AUTHORIZATION,
            authorization_header(credentials, token, extra)?,
        );
        self.transport.send(request).await
    }

    /// Final leg: trade an authorized request token and its verifier for an
    /// access token.
    pub async fn exchange_verifier(
        &self,
        credentials: &Credentials,
        verifier: &str,
    ) -> Result<Credentials> {
        let (Some(token), Some(secret)) = (&credentials.oauth_token, &credentials.oauth_token_secret)
        else {
            return Err(YahooError::Credentials {
                message: "no request token to exchange".to_string(),
            });
        };

        let response = self
            .post_token_request(
                &self.endpoints.get_token,
                credentials,
                Some((token.as_str(), secret.as_str())),
                &[("oauth_verifier", verifier)],
            )
            .await?;
        let mut params = parse_token_response("access token", response)?;

        let mut updated = credentials.clone();
        updated.oauth_access_token = Some(take(&mut params, "access token", "oauth_token")?);
        updated.oauth_access_token_secret =
            Some(take(&mut params, "access token", "oauth_token_secret")?);
        updated.oauth_session_handle = params.remove("oauth_session_handle");
        Ok(updated)
    }
}

#[async_trait]
impl Authorizer for OAuth1 {
    fn sign(&self, mut request: HttpRequest, credentials: &Credentials) -> Result<HttpRequest> {
        let pair = credentials.access_pair().ok_or_else(|| YahooError::Credentials {
            message: "cannot sign a request without an access token".to_string(),
        })?;
        request
            .headers
            .insert(AUTHORIZATION, authorization_header(credentials, Some(pair), &[])?);
        Ok(request)
    }

    async fn register(&self, credentials: &Credentials) -> Result<Credentials> {
        credentials.require_consumer()?;

        let response = self
            .post_token_request(
                &self.endpoints.request_token,
                credentials,
                None,
                &[("oauth_callback", CALLBACK_URL)],
            )
            .await?;
        let mut params = parse_token_response("request token", response)?;

        let mut pending = credentials.clone();
        let request_token = take(&mut params, "request token", "oauth_token")?;
        pending.oauth_token_secret = Some(take(&mut params, "request token", "oauth_token_secret")?);

        let authorize_url = self.authorize_url(&request_token);
        pending.oauth_token = Some(request_token);
        debug!(url = %authorize_url, "waiting for user authorization");
        let verifier = self.prompt.verifier(&authorize_url)?;

        let registered = self.exchange_verifier(&pending, verifier.trim()).await?;
        info!("registered new access token");
        Ok(registered)
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        let pair = credentials.access_pair().ok_or_else(|| YahooError::Credentials {
            message: "cannot refresh without an access token".to_string(),
        })?;
        let handle = credentials
            .oauth_session_handle
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| YahooError::Credentials {
                message: "cannot refresh without a session handle".to_string(),
            })?;

        let response = self
            .post_token_request(
                &self.endpoints.get_token,
                credentials,
                Some(pair),
                &[("oauth_session_handle", handle)],
            )
            .await?;
        let mut params = parse_token_response("refresh", response)?;

        let mut updated = credentials.clone();
        updated.oauth_access_token = Some(take(&mut params, "refresh", "oauth_token")?);
        updated.oauth_access_token_secret = Some(take(&mut params, "refresh", "oauth_token_secret")?);
        if let Some(handle) = params.remove("oauth_session_handle") {
            updated.oauth_session_handle = Some(handle);
        }
        info!("refreshed access token");
        Ok(updated)
    }
}
