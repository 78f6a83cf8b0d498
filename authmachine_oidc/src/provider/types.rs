use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Decoded redirect from the authorization endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthorizationResponse {
    pub code: String,
    pub state: String,
}

/// What the client must remember between issuing the authorization URL and
/// receiving the callback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub nonce: String,
    pub redirect_uri: String,
}

/// Token endpoint reply to an authorization code exchange
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Profile claims returned by the userinfo endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// Name to greet the user with: name, then email, then subject id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Permission descriptors as returned by the provider, passed through untouched
pub type PermissionSet = Vec<Value>;

/// Reply to the `check_token_revoked` grant
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RevocationStatus {
    #[serde(default)]
    pub revoked: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The subset of id_token claims checked on callback
#[derive(Debug, Deserialize)]
pub(crate) struct IdTokenClaims {
    pub(crate) nonce: Option<String>,
}
