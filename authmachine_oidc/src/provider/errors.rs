use thiserror::Error;

use crate::config::ConfigError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("Provider returned {0}: {1}")]
    HttpStatus(reqwest::StatusCode, String),

    #[error("Serde error: {0}")]
    Serde(String),

    #[error("Invalid authorization response: {0}")]
    InvalidResponse(String),

    /// The provider redirected back with an `error` parameter
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("State mismatch")]
    StateMismatch,

    #[error("Nonce mismatch")]
    NonceMismatch,

    #[error("Id token error: {0}")]
    IdToken(String),

    #[error("Provider metadata has no {0}")]
    MissingEndpoint(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
