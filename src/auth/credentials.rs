//! OAuth1 token set and its persistence.

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::debug;

use crate::{Result, YahooError};

/// Consumer key/secret plus whatever tokens the handshake has produced so far.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Request token from the first leg of registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_access_token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_session_handle: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            ..Self::default()
        }
    }

    /// Both access token and secret are set and non-empty.
    pub fn has_access_token(&self) -> bool {
        present(&self.oauth_access_token) && present(&self.oauth_access_token_secret)
    }

    pub fn has_session_handle(&self) -> bool {
        present(&self.oauth_session_handle)
    }

    /// `(token, secret)` when [`has_access_token`](Self::has_access_token) holds.
    pub fn access_pair(&self) -> Option<(&str, &str)> {
        match (&self.oauth_access_token, &self.oauth_access_token_secret) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some((token, secret))
            }
            _ => None,
        }
    }

    pub fn with_access_token(
        mut self,
        token: impl Into<String>,
        secret: impl Into<String>,
        session_handle: Option<String>,
    ) -> Self {
        self.oauth_access_token = Some(token.into());
        self.oauth_access_token_secret = Some(secret.into());
        self.oauth_session_handle = session_handle;
        self
    }

    pub fn require_consumer(&self) -> Result<()> {
        if self.consumer_key.is_empty() || self.consumer_secret.is_empty() {
            return Err(YahooError::Credentials {
                message: "consumer_key and consumer_secret are required".to_string(),
            });
        }
        Ok(())
    }
}

// Secrets stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("oauth_token", &redact(&self.oauth_token))
            .field("oauth_token_secret", &redact(&self.oauth_token_secret))
            .field("oauth_access_token", &redact(&self.oauth_access_token))
            .field(
                "oauth_access_token_secret",
                &redact(&self.oauth_access_token_secret),
            )
            .field("oauth_session_handle", &redact(&self.oauth_session_handle))
            .finish()
    }
}

/// Where credentials live between sessions.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Credentials>;
    fn save(&self, credentials: &Credentials) -> Result<()>;
}

/// Credentials as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for JsonCredentialStore {
    fn load(&self) -> Result<Credentials> {
        let contents = fs::read_to_string(&self.path)?;
        let credentials: Credentials = serde_json::from_str(&contents)?;
        debug!(path = %self.path.display(), "loaded credentials");
        Ok(credentials)
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(credentials)?)?;
        debug!(path = %self.path.display(), "saved credentials");
        Ok(())
    }
}

/// Keeps credentials in memory only; `save` replaces what `load` returns.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: Mutex<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credentials> {
        Ok(self
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<()> {
        *self
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = credentials.clone();
        Ok(())
    }
}
