//! Scripted capabilities for driving the API handle without a network.

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use crate::{
    auth::{Authorizer, CredentialStore, Credentials, MemoryCredentialStore},
    core::ApiConfig,
    yahoo::{
        api::FantasyApi,
        http::{HttpRequest, HttpResponse, Transport},
    },
    Result, YahooError,
};

pub const TEST_BASE: &str = "https://fantasy.test/fantasy/v2/";
pub const TOKEN_HEADER: &str = "x-test-token";

/// Replays queued responses per path suffix and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<Vec<(String, VecDeque<HttpResponse>)>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests whose path ends with `path`.
    pub fn respond(&self, path: &str, status: u16, body: impl Into<String>) -> &Self {
        let response = HttpResponse::new(status, body);
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.iter_mut().find(|(p, _)| p == path) {
            Some((_, queue)) => queue.push_back(response),
            None => scripts.push((path.to_string(), VecDeque::from([response]))),
        }
        self
    }

    /// Queue a `200` whose body wraps `payload` in `fantasy_content`.
    pub fn respond_content(&self, path: &str, payload: Value) -> &Self {
        let body = serde_json::json!({ "fantasy_content": payload });
        self.respond(path, 200, body.to_string())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.path().trim_start_matches("/fantasy/v2/").to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);

        let mut scripts = self.scripts.lock().unwrap();
        let response = scripts
            .iter_mut()
            .find(|(suffix, queue)| !queue.is_empty() && path.ends_with(suffix.as_str()))
            .and_then(|(_, queue)| queue.pop_front());
        Ok(response.unwrap_or_else(|| HttpResponse::new(404, format!("no script for {path}"))))
    }
}

/// Signs with a plain header and counts handshake calls.
#[derive(Default)]
pub struct FakeAuthorizer {
    pub registrations: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub fail_refresh: bool,
}

impl FakeAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_refresh() -> Self {
        Self {
            fail_refresh: true,
            ..Self::default()
        }
    }

    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Authorizer for FakeAuthorizer {
    fn sign(&self, mut request: HttpRequest, credentials: &Credentials) -> Result<HttpRequest> {
        let (token, _) = credentials.access_pair().ok_or_else(|| YahooError::Credentials {
            message: "unsigned".to_string(),
        })?;
        request
            .headers
            .insert(TOKEN_HEADER, HeaderValue::from_str(token)?);
        Ok(request)
    }

    async fn register(&self, credentials: &Credentials) -> Result<Credentials> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(credentials
            .clone()
            .with_access_token("registered", "registered-secret", Some("handle".to_string())))
    }

    async fn refresh(&self, credentials: &Credentials) -> Result<Credentials> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_refresh {
            return Err(YahooError::OAuth {
                message: "refresh rejected".to_string(),
            });
        }
        Ok(credentials.clone().with_access_token(
            format!("refreshed-{n}"),
            "refreshed-secret",
            credentials.oauth_session_handle.clone(),
        ))
    }
}

pub fn signed_in() -> Credentials {
    Credentials::new("consumer", "consumer-secret").with_access_token(
        "initial",
        "initial-secret",
        Some("handle".to_string()),
    )
}

pub struct Harness {
    pub api: FantasyApi,
    pub transport: Arc<ScriptedTransport>,
    pub authorizer: Arc<FakeAuthorizer>,
    pub store: Arc<MemoryCredentialStore>,
}

pub fn harness_with(credentials: Credentials, authorizer: FakeAuthorizer) -> Harness {
    let transport = Arc::new(ScriptedTransport::new());
    let authorizer = Arc::new(authorizer);
    let store = Arc::new(MemoryCredentialStore::new(credentials));
    let api = FantasyApi::with_parts(
        ApiConfig::new(TEST_BASE).unwrap(),
        store.clone() as Arc<dyn CredentialStore>,
        transport.clone(),
        authorizer.clone(),
    )
    .unwrap();
    Harness {
        api,
        transport,
        authorizer,
        store,
    }
}

pub fn harness() -> Harness {
    harness_with(signed_in(), FakeAuthorizer::new())
}
