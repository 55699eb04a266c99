//! Handle configuration: endpoint, response format and credential location.

use std::path::PathBuf;

use url::Url;

use crate::Result;

/// Root of the Fantasy Sports v2 API. Request paths are joined onto this.
pub const DEFAULT_BASE_URL: &str = "https://fantasysports.yahooapis.com/fantasy/v2/";

/// The only response format the decoder understands.
pub const DEFAULT_FORMAT: &str = "json";

pub const BASE_URL_ENV_VAR: &str = "YAHOO_FANTASY_BASE_URL";
pub const AUTH_FILE_ENV_VAR: &str = "YAHOO_FANTASY_AUTH_FILE";

/// Path: ~/.config/yahoo-fantasy/auth.json
pub fn default_credentials_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".config");
        home
    });
    base.join("yahoo-fantasy").join("auth.json")
}

/// Parse a base URL, making sure relative joins keep its last segment.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: Url,
    /// Sent as the `format` query parameter on every request.
    pub format: String,
    pub credentials_path: PathBuf,
}

impl ApiConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            format: DEFAULT_FORMAT.to_string(),
            credentials_path: default_credentials_path(),
        })
    }

    /// Defaults, overridden by `YAHOO_FANTASY_BASE_URL` and `YAHOO_FANTASY_AUTH_FILE`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(BASE_URL_ENV_VAR) {
            Ok(base) if !base.trim().is_empty() => Self::new(&base)?,
            _ => Self::new(DEFAULT_BASE_URL)?,
        };
        if let Ok(path) = std::env::var(AUTH_FILE_ENV_VAR) {
            if !path.trim().is_empty() {
                config.credentials_path = PathBuf::from(path);
            }
        }
        Ok(config)
    }

    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Absolute URL for a request path such as `league/nfl.l.1/teams`.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}
