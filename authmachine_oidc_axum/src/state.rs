use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use authmachine_oidc::{ConfigError, ProviderClient};

/// Shared, read-only state handed to every route handler
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ProviderClient>,
    key: Key,
    /// Whether the session cookie carries the `Secure` attribute
    pub secure_cookies: bool,
}

impl AppState {
    /// Builds the state from the client's configuration.
    ///
    /// Without `SESSION_SECRET` a random signing key is generated, so sessions
    /// do not survive a restart.
    pub fn new(client: ProviderClient) -> Result<Self, ConfigError> {
        let config = client.config();
        let key = match &config.session_secret {
            Some(secret) => Key::try_from(secret.as_bytes()).map_err(|e| {
                ConfigError::InvalidValue("SESSION_SECRET".to_string(), e.to_string())
            })?,
            None => {
                tracing::warn!("SESSION_SECRET not set, using a random session key");
                Key::generate()
            }
        };
        let secure_cookies = !config.debug;

        Ok(Self::with_key(client, key, secure_cookies))
    }

    pub fn with_key(client: ProviderClient, key: Key, secure_cookies: bool) -> Self {
        Self {
            client: Arc::new(client),
            key,
            secure_cookies,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}
