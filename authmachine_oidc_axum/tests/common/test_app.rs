use axum::{
    Router,
    body::Body,
    http::{HeaderMap, HeaderValue, Request, Response, header},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use http_body_util::BodyExt;
use httpmock::MockServer;
use tower::ServiceExt;

use authmachine_oidc::{ProviderClient, ProviderMetadata};
use authmachine_oidc_axum::{AppState, SESSION_COOKIE_NAME, SessionContext, app_router_no_trace};

use super::fixtures::{TEST_HOST, test_config, test_metadata};

/// Router under test wired to a mocked provider
pub struct TestApp {
    pub server: MockServer,
    key: Key,
    router: Router,
}

impl TestApp {
    pub async fn start() -> Self {
        let server = MockServer::start_async().await;
        let metadata = test_metadata(&server.base_url());
        Self::with_metadata(server, metadata)
    }

    pub fn with_metadata(server: MockServer, metadata: ProviderMetadata) -> Self {
        let client = ProviderClient::new(test_config(&server.base_url()), metadata)
            .expect("Failed to build provider client");
        let key = Key::generate();
        let router = app_router_no_trace(AppState::with_key(client, key.clone(), false));
        Self {
            server,
            key,
            router,
        }
    }

    /// Sends a GET request, with the session cookie when given.
    pub async fn get(&self, uri: &str, session: Option<&SessionContext>) -> Response<Body> {
        self.get_with_headers(uri, session, HeaderMap::new()).await
    }

    pub async fn get_with_headers(
        &self,
        uri: &str,
        session: Option<&SessionContext>,
        headers: HeaderMap,
    ) -> Response<Body> {
        let mut builder = Request::builder().uri(uri).header(header::HOST, TEST_HOST);
        if let Some(session) = session {
            builder = builder.header(header::COOKIE, self.session_cookie(session));
        }
        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }
        let request = builder.body(Body::empty()).expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request exactly as built, without adding a `Host` header.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router call failed")
    }

    /// `name=value` pair of the signed cookie a browser would hold for `session`.
    pub fn session_cookie(&self, session: &SessionContext) -> String {
        let jar = session
            .save(SignedCookieJar::new(self.key.clone()), false)
            .expect("Failed to save session");
        session_pairs(&jar.into_response().into_parts().0.headers)
            .pop()
            .expect("Session cookie not set")
    }

    /// Session written back by the response, `None` when the cookie was left untouched.
    pub fn session_from_response(&self, response: &Response<Body>) -> Option<SessionContext> {
        let pair = session_pairs(response.headers()).pop()?;
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&pair).expect("Invalid cookie header"),
        );
        let jar = SignedCookieJar::from_headers(&headers, self.key.clone());
        Some(SessionContext::load(&jar))
    }
}

fn session_pairs(headers: &HeaderMap) -> Vec<String> {
    let prefix = format!("{SESSION_COOKIE_NAME}=");
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| pair.starts_with(&prefix))
        .map(String::from)
        .collect()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("Missing Location header")
        .to_string()
}

pub fn set_cookie_headers(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
