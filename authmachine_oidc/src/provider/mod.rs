mod client;
mod discovery;
mod errors;
mod types;

pub use client::{CHECK_TOKEN_REVOKED_GRANT, PERMISSIONS_CLAIM, ProviderClient, USERS_API_PATH};
pub use discovery::ProviderMetadata;
pub use errors::ProviderError;
pub use types::{
    AuthorizationResponse, PendingAuthorization, PermissionSet, RevocationStatus, TokenResponse,
    UserInfo,
};
