//! Process-wide configuration for the AuthMachine client

use thiserror::Error;
use url::Url;

/// Scope requested when `AUTHMACHINE_SCOPE` is not set
pub const DEFAULT_SCOPE: &str = "openid profile email";

/// Permission objects requested when `AUTHMACHINE_PERMISSION_OBJECTS` is not set
pub const DEFAULT_PERMISSION_OBJECTS: [&str; 2] = ["object1", "object2"];

/// Objects sent to the permissions API when `AUTHMACHINE_PERMISSION_QUERY_OBJECTS` is not set.
/// The provider's REST API names them differently from the `claims` request.
pub const DEFAULT_PERMISSION_QUERY_OBJECTS: [&str; 2] = ["obj1", "obj2"];

/// Port used by the demo server when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3001;

/// Minimum length of `SESSION_SECRET`, the size of a signing key for signed cookies
pub const SESSION_SECRET_MIN_LEN: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid URL in {0}: {1}")]
    InvalidUrl(String, String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Can't perform an API request: API token not specified")]
    MissingApiToken,
}

/// Immutable configuration, built once at startup and shared read-only.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the identity provider, also the expected OIDC issuer
    pub provider_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    /// Static token for the provider's REST API, distinct from user tokens
    pub api_token: Option<String>,
    /// Object names requested in the `claims` parameter of the authorization request
    pub permission_objects: Vec<String>,
    /// Object names passed as `object=` to the permissions API
    pub permission_query_objects: Vec<String>,
    pub session_secret: Option<String>,
    pub debug: bool,
    pub port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("provider_url", &self.provider_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("permission_objects", &self.permission_objects)
            .field("permission_query_objects", &self.permission_query_objects)
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("debug", &self.debug)
            .field("port", &self.port)
            .finish()
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required =
            |key: &str| non_empty(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let provider_url = required("AUTHMACHINE_URL")?;
        Url::parse(&provider_url)
            .map_err(|e| ConfigError::InvalidUrl("AUTHMACHINE_URL".to_string(), e.to_string()))?;
        let provider_url = provider_url.trim_end_matches('/').to_string();

        let object_list = |key: &str, default: &[&str]| match non_empty(key) {
            Some(list) => {
                let objects: Vec<String> = list
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect();
                if objects.is_empty() {
                    return Err(ConfigError::InvalidValue(key.to_string(), list));
                }
                Ok(objects)
            }
            None => Ok(default.iter().map(|s| s.to_string()).collect()),
        };
        let permission_objects = object_list(
            "AUTHMACHINE_PERMISSION_OBJECTS",
            DEFAULT_PERMISSION_OBJECTS.as_slice(),
        )?;
        let permission_query_objects = object_list(
            "AUTHMACHINE_PERMISSION_QUERY_OBJECTS",
            DEFAULT_PERMISSION_QUERY_OBJECTS.as_slice(),
        )?;

        let session_secret = non_empty("SESSION_SECRET");
        if let Some(secret) = &session_secret {
            if secret.len() < SESSION_SECRET_MIN_LEN {
                return Err(ConfigError::InvalidValue(
                    "SESSION_SECRET".to_string(),
                    format!("must be at least {SESSION_SECRET_MIN_LEN} bytes"),
                ));
            }
        }

        let port = match non_empty("PORT") {
            Some(p) => p
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string(), p))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            provider_url,
            client_id: required("AUTHMACHINE_CLIENT_ID")?,
            client_secret: required("AUTHMACHINE_CLIENT_SECRET")?,
            scope: non_empty("AUTHMACHINE_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            api_token: non_empty("AUTHMACHINE_API_TOKEN"),
            permission_objects,
            permission_query_objects,
            session_secret,
            debug: non_empty("DEBUG").is_some_and(|v| parse_flag(&v)),
            port,
        })
    }

    /// The API token, or the error every API call fails with when it is absent.
    pub fn require_api_token(&self) -> Result<&str, ConfigError> {
        self.api_token
            .as_deref()
            .ok_or(ConfigError::MissingApiToken)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
