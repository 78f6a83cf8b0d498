//! Routes of the login flow

use axum::{Router, routing::get};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers::{index, login, logout, oidc_callback, oidc_logout_callback};
use super::state::AppState;

pub const INDEX_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
/// Redirect URI registered with the provider for the authorization code
pub const CALLBACK_PATH: &str = "/oidc-callback";
pub const LOGOUT_PATH: &str = "/logout";
/// Post-logout redirect URI registered with the provider
pub const LOGOUT_CALLBACK_PATH: &str = "/oidc-logout-callback";

/// Create the application router with HTTP request tracing
///
/// The endpoints are:
/// - `GET /` home page, re-validates the session token
/// - `GET /login` redirect to the provider's authorization endpoint
/// - `GET /oidc-callback` code exchange, stores the session
/// - `GET /logout` redirect to the provider's end-session endpoint
/// - `GET /oidc-logout-callback` clears the session
pub fn app_router(state: AppState) -> Router {
    app_router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `app_router()` but without the HTTP tracing middleware.
pub fn app_router_no_trace(state: AppState) -> Router {
    Router::new()
        .route(INDEX_PATH, get(index))
        .route(LOGIN_PATH, get(login))
        .route(CALLBACK_PATH, get(oidc_callback))
        .route(LOGOUT_PATH, get(logout))
        .route(LOGOUT_CALLBACK_PATH, get(oidc_logout_callback))
        .with_state(state)
}
