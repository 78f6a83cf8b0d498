use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};
use axum_extra::extract::{Host, cookie::SignedCookieJar};
use http::{HeaderMap, StatusCode};

use super::error::IntoResponseError;
use super::router::{CALLBACK_PATH, INDEX_PATH, LOGIN_PATH, LOGOUT_CALLBACK_PATH, LOGOUT_PATH};
use super::session::SessionContext;
use super::state::AppState;

#[derive(Template)]
#[template(path = "index.j2")]
struct IndexTemplate<'a> {
    user_name: Option<&'a str>,
    user_info_json: Option<String>,
    login_path: &'a str,
    logout_path: &'a str,
}

/// `scheme://host` of the current request, as seen by the browser.
pub(crate) fn request_origin(headers: &HeaderMap, host: &str) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}

/// Home page. An authenticated session is re-validated against the provider
/// and dropped if its token was revoked.
pub(crate) async fn index(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), (StatusCode, String)> {
    let mut session = SessionContext::load(&jar);

    let revoked = match (session.is_authenticated(), session.token()) {
        (true, Some(token)) => state
            .client
            .check_token_revoked(token)
            .await
            .into_response_error()?
            .is_some_and(|status| status.revoked),
        _ => false,
    };

    let jar = if revoked {
        tracing::info!("Token revoked by the provider, clearing session");
        session.clear();
        session.save(jar, state.secure_cookies).into_response_error()?
    } else {
        jar
    };

    let user_info_json = session
        .user_info()
        .map(serde_json::to_string_pretty)
        .transpose()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let template = IndexTemplate {
        user_name: session.user_info().map(|u| u.display_name()),
        user_info_json,
        login_path: LOGIN_PATH,
        logout_path: LOGOUT_PATH,
    };
    let html = Html(template.render().into_response_error()?);

    Ok((jar, html))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Host(host): Host,
    headers: HeaderMap,
) -> Result<(SignedCookieJar, Redirect), (StatusCode, String)> {
    let redirect_uri = format!("{}{}", request_origin(&headers, &host), CALLBACK_PATH);
    let (auth_url, pending) = state
        .client
        .build_authorization_url(&redirect_uri)
        .into_response_error()?;

    let mut session = SessionContext::load(&jar);
    session.set_pending(pending);
    let jar = session
        .save(jar, state.secure_cookies)
        .into_response_error()?;

    Ok((jar, Redirect::to(&auth_url)))
}

pub(crate) async fn oidc_callback(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<HashMap<String, String>>,
) -> Result<(SignedCookieJar, Redirect), (StatusCode, String)> {
    let mut session = SessionContext::load(&jar);
    let pending = session.take_pending().ok_or_else(|| {
        tracing::error!("Callback received without an authorization request in progress");
        (
            StatusCode::BAD_REQUEST,
            "No authorization request in progress".to_string(),
        )
    })?;

    let client = &state.client;
    let auth_response = client
        .parse_authorization_response(&params)
        .into_response_error()?;
    let token = client
        .exchange_code_for_token(&auth_response, &pending)
        .await
        .into_response_error()?;
    let user_info = client.fetch_user_info(&token).await.into_response_error()?;

    tracing::info!("User {} logged in", user_info.sub);
    session.set_authenticated(token, user_info);
    let jar = session
        .save(jar, state.secure_cookies)
        .into_response_error()?;

    Ok((jar, Redirect::to(INDEX_PATH)))
}

/// Ends the local session and sends the browser to the provider's logout.
pub(crate) async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Host(host): Host,
    headers: HeaderMap,
) -> Result<(SignedCookieJar, Redirect), (StatusCode, String)> {
    let post_logout_redirect_uri =
        format!("{}{}", request_origin(&headers, &host), LOGOUT_CALLBACK_PATH);
    let logout_url = state
        .client
        .build_logout_url(&post_logout_redirect_uri)
        .into_response_error()?;

    let jar = SessionContext::default()
        .save(jar, state.secure_cookies)
        .into_response_error()?;

    Ok((jar, Redirect::to(&logout_url)))
}

pub(crate) async fn oidc_logout_callback(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Redirect), (StatusCode, String)> {
    let jar = SessionContext::default()
        .save(jar, state.secure_cookies)
        .into_response_error()?;

    Ok((jar, Redirect::to(INDEX_PATH)))
}
