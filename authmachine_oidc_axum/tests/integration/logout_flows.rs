use std::collections::HashMap;

use axum::http::StatusCode;
use httpmock::MockServer;

use authmachine_oidc_axum::SessionContext;

use crate::common::*;

fn logged_in_session() -> SessionContext {
    let mut session = SessionContext::default();
    session.set_authenticated(test_token(), test_user());
    session
}

#[tokio::test]
async fn test_logout_redirects_to_end_session() {
    let app = TestApp::start().await;

    let response = app.get("/logout", Some(&logged_in_session())).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = location(&response);
    assert!(location.starts_with(&app.server.url("/oidc/end-session?")));

    let query: HashMap<String, String> = url::Url::parse(&location)
        .expect("Location is not an absolute URL")
        .query_pairs()
        .into_owned()
        .collect();
    assert_eq!(
        query["post_logout_redirect_uri"],
        format!("http://{TEST_HOST}/oidc-logout-callback")
    );
    assert_eq!(query["revoke_tokens"], "1");
    assert!(!query["state"].is_empty());

    let session = app
        .session_from_response(&response)
        .expect("Logout must clear the session cookie");
    assert!(session.is_empty());
}

#[tokio::test]
async fn test_logout_without_end_session_endpoint() {
    let server = MockServer::start_async().await;
    let mut metadata = test_metadata(&server.base_url());
    metadata.end_session_endpoint = None;
    let app = TestApp::with_metadata(server, metadata);

    let response = app.get("/logout", Some(&logged_in_session())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_logout_callback_clears_session() {
    let app = TestApp::start().await;

    let response = app
        .get("/oidc-logout-callback?state=anything", Some(&logged_in_session()))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let session = app
        .session_from_response(&response)
        .expect("Logout callback must clear the session cookie");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_logout_callback_without_session() {
    let app = TestApp::start().await;

    let response = app.get("/oidc-logout-callback", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
