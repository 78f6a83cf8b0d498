use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use authmachine_oidc::{PendingAuthorization, TokenResponse, UserInfo};

/// Name of the signed cookie carrying the session
pub const SESSION_COOKIE_NAME: &str = "authmachine_session";

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Serde error: {0}")]
    Serde(String),
}

/// Per-browser session, loaded from the signed cookie at the start of a
/// request and written back explicitly by the handler that changed it.
///
/// `user_info` is present only after a completed login callback, so its
/// presence is what "authenticated" means.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<TokenResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_info: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pending: Option<PendingAuthorization>,
}

impl SessionContext {
    /// Reads the session from the jar. A missing, forged or unreadable
    /// cookie yields an empty session.
    pub fn load(jar: &SignedCookieJar) -> Self {
        let Some(cookie) = jar.get(SESSION_COOKIE_NAME) else {
            return Self::default();
        };

        match serde_json::from_str(cookie.value()) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding unreadable session cookie: {}", e);
                Self::default()
            }
        }
    }

    /// Writes the session into the jar; an empty session removes the cookie.
    pub fn save(
        &self,
        jar: SignedCookieJar,
        secure: bool,
    ) -> Result<SignedCookieJar, SessionError> {
        if self.is_empty() {
            tracing::debug!("Removing session cookie");
            return Ok(jar.remove(Cookie::build((SESSION_COOKIE_NAME, "")).path("/")));
        }

        let value = serde_json::to_string(self).map_err(|e| SessionError::Serde(e.to_string()))?;
        let cookie = Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(secure);

        Ok(jar.add(cookie))
    }

    pub fn token(&self) -> Option<&TokenResponse> {
        self.token.as_ref()
    }

    pub fn user_info(&self) -> Option<&UserInfo> {
        self.user_info.as_ref()
    }

    pub fn pending(&self) -> Option<&PendingAuthorization> {
        self.pending.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_info.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user_info.is_none() && self.pending.is_none()
    }

    /// Records a completed login. Any pending authorization is dropped.
    pub fn set_authenticated(&mut self, token: TokenResponse, user_info: UserInfo) {
        self.token = Some(token);
        self.user_info = Some(user_info);
        self.pending = None;
    }

    pub fn set_pending(&mut self, pending: PendingAuthorization) {
        self.pending = Some(pending);
    }

    pub fn take_pending(&mut self) -> Option<PendingAuthorization> {
        self.pending.take()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
