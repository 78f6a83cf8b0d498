use http::StatusCode;

use authmachine_oidc::ProviderError;

use super::session::SessionError;

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

fn provider_error_status(error: &ProviderError) -> StatusCode {
    match error {
        ProviderError::StateMismatch
        | ProviderError::NonceMismatch
        | ProviderError::IdToken(_)
        | ProviderError::InvalidResponse(_)
        | ProviderError::Authorization(_) => StatusCode::BAD_REQUEST,
        ProviderError::Discovery(_)
        | ProviderError::Request(_)
        | ProviderError::HttpStatus(_, _)
        | ProviderError::Serde(_) => StatusCode::BAD_GATEWAY,
        ProviderError::MissingEndpoint(_) | ProviderError::Config(_) | ProviderError::Utils(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Maps provider failures: rejected callbacks are the client's fault,
/// upstream failures are a bad gateway, the rest is ours.
impl<T> IntoResponseError<T> for Result<T, ProviderError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = provider_error_status(&e);
            tracing::error!("Provider error ({}): {}", status, e);
            (status, e.to_string())
        })
    }
}

impl<T> IntoResponseError<T> for Result<T, SessionError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

/// Template rendering failures
impl<T> IntoResponseError<T> for Result<T, askama::Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}
