use std::collections::HashMap;
use std::time::Duration;

use http::{
    Method, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use url::Url;

use crate::config::Config;
use crate::utils::{base64url_decode, gen_random_string};

use super::discovery::{ProviderMetadata, fetch_provider_metadata};
use super::errors::ProviderError;
use super::types::{
    AuthorizationResponse, IdTokenClaims, PendingAuthorization, PermissionSet, RevocationStatus,
    TokenResponse, UserInfo,
};

/// Claim under which the provider returns the requested permissions
pub const PERMISSIONS_CLAIM: &str = "authmachine_permissions";

/// REST resource holding per-user permission queries
pub const USERS_API_PATH: &str = "api/scim/v1/Users";

/// Non-standard grant accepted by the token endpoint to report revocation status
pub const CHECK_TOKEN_REVOKED_GRANT: &str = "check_token_revoked";

const RANDOM_TOKEN_BYTES: usize = 32;

/// Creates the HTTP client used for every provider call:
///
/// - `timeout`: 30 seconds, so a stalled provider cannot hang a request forever.
/// - `pool_idle_timeout`: 90 seconds before idle connections are dropped.
/// - `pool_max_idle_per_host`: 32 idle connections kept per host.
fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(ProviderError::from)
}

/// Typed access to every outbound interaction with the identity provider.
///
/// One instance is built at startup and shared by all requests; it holds no
/// per-user state.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: Config,
    metadata: ProviderMetadata,
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new(config: Config, metadata: ProviderMetadata) -> Result<Self, ProviderError> {
        Ok(Self {
            config,
            metadata,
            http: build_http_client()?,
        })
    }

    /// Fetches the provider metadata from the configured issuer and builds the client.
    pub async fn discover(config: Config) -> Result<Self, ProviderError> {
        let http = build_http_client()?;
        tracing::debug!("Fetching OIDC discovery for issuer: {}", config.provider_url);
        let metadata = fetch_provider_metadata(&http, &config.provider_url).await?;
        Ok(Self {
            config,
            metadata,
            http,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    /// Returns the authorization endpoint URL for a new login attempt, and the
    /// state/nonce pair the callback has to be checked against.
    pub fn build_authorization_url(
        &self,
        redirect_uri: &str,
    ) -> Result<(String, PendingAuthorization), ProviderError> {
        let pending = PendingAuthorization {
            state: gen_random_string(RANDOM_TOKEN_BYTES)?,
            nonce: gen_random_string(RANDOM_TOKEN_BYTES)?,
            redirect_uri: redirect_uri.to_string(),
        };

        let mut claims = Map::new();
        claims.insert(
            PERMISSIONS_CLAIM.to_string(),
            json!(self.config.permission_objects),
        );

        let mut url = endpoint_url(&self.metadata.authorization_endpoint)?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scope)
            .append_pair("claims", &Value::Object(claims).to_string())
            .append_pair("nonce", &pending.nonce)
            .append_pair("redirect_uri", &pending.redirect_uri)
            .append_pair("state", &pending.state);

        tracing::debug!("Auth URL: {}", url);
        Ok((url.into(), pending))
    }

    /// Returns the end-session URL; the provider also revokes the user's tokens.
    pub fn build_logout_url(&self, post_logout_redirect_uri: &str) -> Result<String, ProviderError> {
        let endpoint = self
            .metadata
            .end_session_endpoint
            .as_deref()
            .ok_or(ProviderError::MissingEndpoint("end_session_endpoint"))?;
        let state = gen_random_string(RANDOM_TOKEN_BYTES)?;

        let mut url = endpoint_url(endpoint)?;
        url.query_pairs_mut()
            .append_pair("scope", &self.config.scope)
            .append_pair("post_logout_redirect_uri", post_logout_redirect_uri)
            .append_pair("state", &state)
            .append_pair("revoke_tokens", "1");

        tracing::debug!("Logout URL: {}", url);
        Ok(url.into())
    }

    /// Decodes the query string the provider redirected the browser back with.
    pub fn parse_authorization_response(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<AuthorizationResponse, ProviderError> {
        if let Some(error) = query.get("error") {
            let message = match query.get("error_description") {
                Some(description) if !description.is_empty() => format!("{error}: {description}"),
                _ => error.clone(),
            };
            tracing::error!("Provider returned an authorization error: {}", message);
            return Err(ProviderError::Authorization(message));
        }

        let field = |name: &str| {
            query
                .get(name)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
                .ok_or_else(|| ProviderError::InvalidResponse(format!("missing {name}")))
        };

        Ok(AuthorizationResponse {
            code: field("code")?,
            state: field("state")?,
        })
    }

    /// Exchanges the authorization code for tokens (client_secret_post).
    pub async fn exchange_code_for_token(
        &self,
        auth_response: &AuthorizationResponse,
        pending: &PendingAuthorization,
    ) -> Result<TokenResponse, ProviderError> {
        if auth_response.state != pending.state {
            tracing::error!("State in response: {:#?}", auth_response.state);
            tracing::error!("Expected state: {:#?}", pending.state);
            return Err(ProviderError::StateMismatch);
        }

        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", auth_response.code.as_str()),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", pending.redirect_uri.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await?;

        let token: TokenResponse = read_json(response, "Token exchange").await?;

        match &token.id_token {
            Some(id_token) => verify_nonce(id_token, &pending.nonce)?,
            None => tracing::debug!("No id_token in token response, nonce not checked"),
        }

        Ok(token)
    }

    pub async fn fetch_user_info(&self, token: &TokenResponse) -> Result<UserInfo, ProviderError> {
        let response = self
            .http
            .get(&self.metadata.userinfo_endpoint)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let user_info: UserInfo = read_json(response, "Userinfo request").await?;
        tracing::debug!("User info for subject: {}", user_info.sub);
        Ok(user_info)
    }

    /// Calls the provider's REST API with the static API token.
    ///
    /// The raw response is returned; callers decide what a status means.
    pub async fn call_provider_api(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response, ProviderError> {
        let api_token = self.config.require_api_token()?;
        let url = format!(
            "{}/{}",
            self.config.provider_url,
            path.trim_start_matches('/')
        );

        tracing::debug!("Provider API request: {} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Token {api_token}"));

        if !query.is_empty() {
            request = request.query(query);
        }

        // serde_json maps are key-ordered, so the body is serialized with sorted keys
        if let Some(payload) = payload {
            request = request.body(serde_json::to_string(payload)?);
        }

        Ok(request.send().await?)
    }

    /// Permissions of `user_id` on `permission_query_objects`.
    ///
    /// Any non-200 answer yields an empty list, so a provider outage looks
    /// like "no permissions" to the caller.
    pub async fn get_permissions(&self, user_id: &str) -> Result<PermissionSet, ProviderError> {
        let path = format!(
            "{USERS_API_PATH}/{}/permissions",
            urlencoding::encode(user_id)
        );
        let query: Vec<(&str, &str)> = self
            .config
            .permission_query_objects
            .iter()
            .map(|object| ("object", object.as_str()))
            .collect();

        let response = self
            .call_provider_api(Method::GET, &path, None, &query)
            .await?;

        if response.status() != StatusCode::OK {
            tracing::warn!(
                "Permission query for {} returned {}, treating as no permissions",
                user_id,
                response.status()
            );
            return Ok(Vec::new());
        }

        read_json(response, "Permission query").await
    }

    /// Asks the token endpoint whether `token` has been revoked.
    ///
    /// Any non-200 answer yields `None`, which callers treat as "not revoked".
    pub async fn check_token_revoked(
        &self,
        token: &TokenResponse,
    ) -> Result<Option<RevocationStatus>, ProviderError> {
        let response = self
            .http
            .post(&self.metadata.token_endpoint)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("access_token", token.access_token.as_str()),
                ("grant_type", CHECK_TOKEN_REVOKED_GRANT),
            ])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            tracing::warn!(
                "Revocation check returned {}, treating token as not revoked",
                response.status()
            );
            return Ok(None);
        }

        let status: RevocationStatus = read_json(response, "Revocation check").await?;
        tracing::debug!("Token revoked: {}", status.revoked);
        Ok(Some(status))
    }
}

fn endpoint_url(endpoint: &str) -> Result<Url, ProviderError> {
    Url::parse(endpoint)
        .map_err(|e| ProviderError::Discovery(format!("Invalid endpoint {endpoint}: {e}")))
}

async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
    what: &str,
) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!("{} failed with status {}: {}", what, status, body);
        return Err(ProviderError::HttpStatus(status, body));
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::Serde(format!("{what}: {e}")))
}

/// Compares the id_token `nonce` claim with the one sent in the authorization request.
/// The token signature is not verified here.
fn verify_nonce(id_token: &str, expected_nonce: &str) -> Result<(), ProviderError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| ProviderError::IdToken("Invalid token format".to_string()))?;
    let bytes = base64url_decode(payload).map_err(|e| ProviderError::IdToken(e.to_string()))?;
    let claims: IdTokenClaims =
        serde_json::from_slice(&bytes).map_err(|e| ProviderError::IdToken(e.to_string()))?;

    if claims.nonce.as_deref() != Some(expected_nonce) {
        tracing::error!("Nonce in ID Token: {:#?}", claims.nonce);
        tracing::error!("Expected nonce: {:#?}", expected_nonce);
        return Err(ProviderError::NonceMismatch);
    }
    Ok(())
}
