//! Error types for the Yahoo Fantasy Sports client

use thiserror::Error;


pub type Result<T> = std::result::Result<T, YahooError>;

#[derive(Error, Debug)]
pub enum YahooError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The wire data did not have the shape the decoder expected.
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    /// Well-formed data that simply does not contain what was asked for.
    #[error("Not found: {what}")]
    NotFound { what: String },

    /// The request was still rejected after one token refresh.
    #[error("Yahoo API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Response is missing the `{key}` wrapper")]
    MissingWrapper { key: String },

    #[error("OAuth handshake failed: {message}")]
    OAuth { message: String },

    #[error("Credential store error: {message}")]
    Credentials { message: String },
}

impl YahooError {
    pub fn decode(message: impl Into<String>) -> Self {
        YahooError::Decode {
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        YahooError::NotFound { what: what.into() }
    }

    /// True for errors a caller doing an optional lookup is expected to handle.
    pub fn is_not_found(&self) -> bool {
        matches!(self, YahooError::NotFound { .. })
    }
}
