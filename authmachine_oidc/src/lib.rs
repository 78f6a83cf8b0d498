//! authmachine_oidc - OpenID Connect client for the AuthMachine identity provider
//!
//! Builds authorization and logout URLs, exchanges authorization codes,
//! fetches user info, queries permissions and checks token revocation.
//! Web framework integration lives in `authmachine-oidc-axum`.

mod config;
mod provider;
mod utils;

pub use config::{
    Config, ConfigError, DEFAULT_PERMISSION_OBJECTS, DEFAULT_PERMISSION_QUERY_OBJECTS, DEFAULT_PORT,
    DEFAULT_SCOPE, SESSION_SECRET_MIN_LEN,
};

pub use provider::{
    AuthorizationResponse, CHECK_TOKEN_REVOKED_GRANT, PERMISSIONS_CLAIM, PendingAuthorization,
    PermissionSet, ProviderClient, ProviderError, ProviderMetadata, RevocationStatus,
    TokenResponse, USERS_API_PATH, UserInfo,
};

pub use utils::{UtilError, gen_random_string};

// Re-exported so callers of `call_provider_api` don't need their own `http` dependency
pub use http::Method;
