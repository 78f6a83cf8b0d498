use authmachine_oidc::{
    Config, PendingAuthorization, ProviderMetadata, TokenResponse, UserInfo,
};
use serde_json::json;

pub const TEST_HOST: &str = "app.test";
pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";
pub const TEST_STATE: &str = "test-state";
pub const TEST_NONCE: &str = "test-nonce";
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

pub fn test_config(provider_url: &str) -> Config {
    Config {
        provider_url: provider_url.to_string(),
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: TEST_CLIENT_SECRET.to_string(),
        scope: "openid profile email".to_string(),
        api_token: Some("test-api-token".to_string()),
        permission_objects: vec!["object1".to_string(), "object2".to_string()],
        permission_query_objects: vec!["obj1".to_string(), "obj2".to_string()],
        session_secret: None,
        debug: true,
        port: 3001,
    }
}

pub fn test_metadata(base: &str) -> ProviderMetadata {
    ProviderMetadata {
        issuer: base.to_string(),
        authorization_endpoint: format!("{base}/oidc/auth"),
        token_endpoint: format!("{base}/oidc/token"),
        userinfo_endpoint: format!("{base}/oidc/userinfo"),
        end_session_endpoint: Some(format!("{base}/oidc/end-session")),
        jwks_uri: None,
        scopes_supported: None,
        response_types_supported: None,
        grant_types_supported: None,
        claims_supported: None,
    }
}

pub fn test_pending() -> PendingAuthorization {
    PendingAuthorization {
        state: TEST_STATE.to_string(),
        nonce: TEST_NONCE.to_string(),
        redirect_uri: format!("http://{TEST_HOST}/oidc-callback"),
    }
}

pub fn test_token() -> TokenResponse {
    serde_json::from_value(json!({
        "access_token": TEST_ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .expect("valid token fixture")
}

pub fn test_user() -> UserInfo {
    serde_json::from_value(json!({
        "sub": "user-42",
        "name": "Test User",
        "email": "test@example.com"
    }))
    .expect("valid user fixture")
}
