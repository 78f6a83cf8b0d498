//! authmachine_oidc_axum - Axum routes for the AuthMachine OIDC login flow
//!
//! Keeps the user's token and profile in a signed cookie and exposes the
//! login, callback, logout and home routes on top of
//! [`authmachine_oidc::ProviderClient`].

mod error;
mod handlers;
mod router;
mod session;
mod state;

pub use error::IntoResponseError;
pub use router::{
    CALLBACK_PATH, INDEX_PATH, LOGIN_PATH, LOGOUT_CALLBACK_PATH, LOGOUT_PATH, app_router,
    app_router_no_trace,
};
pub use session::{SESSION_COOKIE_NAME, SessionContext, SessionError};
pub use state::AppState;

// Re-export the client crate so applications need a single dependency
pub use authmachine_oidc;
