use serde::{Deserialize, Serialize};

use super::errors::ProviderError;

/// Subset of the provider's `/.well-known/openid-configuration` document.
///
/// The token endpoint also answers the revocation check.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProviderMetadata {
    pub issuer: String,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    /// Absent when the provider does not support RP-initiated logout
    pub end_session_endpoint: Option<String>,
    pub jwks_uri: Option<String>,
    pub scopes_supported: Option<Vec<String>>,
    pub response_types_supported: Option<Vec<String>>,
    pub grant_types_supported: Option<Vec<String>>,
    pub claims_supported: Option<Vec<String>>,
}

/// Downloads the discovery document and checks that it belongs to `issuer_url`.
pub(crate) async fn fetch_provider_metadata(
    client: &reqwest::Client,
    issuer_url: &str,
) -> Result<ProviderMetadata, ProviderError> {
    let issuer_url = issuer_url.trim_end_matches('/');
    let discovery_url = format!("{issuer_url}/.well-known/openid-configuration");

    tracing::debug!("Discovery URL: {}", discovery_url);

    let response = client
        .get(&discovery_url)
        .send()
        .await
        .map_err(|e| ProviderError::Discovery(e.to_string()))?;

    if !response.status().is_success() {
        tracing::error!("Discovery request returned {}", response.status());
        return Err(ProviderError::Discovery(format!(
            "{discovery_url} returned {}",
            response.status()
        )));
    }

    let metadata: ProviderMetadata = response
        .json()
        .await
        .map_err(|e| ProviderError::Discovery(format!("Invalid discovery document: {e}")))?;

    // The issuer published by the provider must be the one we were configured with
    if metadata.issuer.trim_end_matches('/') != issuer_url {
        tracing::error!(
            "Discovered issuer {} does not match configured {}",
            metadata.issuer,
            issuer_url
        );
        return Err(ProviderError::Discovery(format!(
            "Issuer mismatch: discovered={}, expected={}",
            metadata.issuer, issuer_url
        )));
    }

    tracing::debug!(
        "Authorization endpoint: {}",
        metadata.authorization_endpoint
    );
    tracing::debug!("Token endpoint: {}", metadata.token_endpoint);
    tracing::debug!("End session endpoint: {:?}", metadata.end_session_endpoint);

    Ok(metadata)
}
