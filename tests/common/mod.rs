//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, RawQuery, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use qq_oauth_proxy::config::ProxyConfig;
use qq_oauth_proxy::http::HttpServer;
use qq_oauth_proxy::lifecycle::Shutdown;
use qq_oauth_proxy::registry::TokenRegistry;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Scripted behaviour and call log of the fake provider.
pub struct MockState {
    pub calls: AtomicUsize,
    pub token_reply: Mutex<(StatusCode, Value)>,
    pub user_info_status: Mutex<StatusCode>,
    pub last_token_form: Mutex<Vec<(String, String)>>,
    pub last_user_info_query: Mutex<HashMap<String, String>>,
    pub last_authorize_query: Mutex<Option<String>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            token_reply: Mutex::new((
                StatusCode::OK,
                json!({"access_token": "T1", "expires_in": "7776000", "refresh_token": "R1"}),
            )),
            user_info_status: Mutex::new(StatusCode::OK),
            last_token_form: Mutex::new(Vec::new()),
            last_user_info_query: Mutex::new(HashMap::new()),
            last_authorize_query: Mutex::new(None),
        }
    }
}

impl MockState {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_token_reply(&self, status: StatusCode, body: Value) {
        *self.token_reply.lock().unwrap() = (status, body);
    }
}

/// A fake QQ provider bound to an ephemeral port.
pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

/// Start the fake provider.
///
/// `/oauth2.0/me` accepts every token except those starting with `revoked`,
/// which get a 401, and those starting with `noopenid`, which get a body
/// without `openid`.
pub async fn start_mock_upstream() -> MockUpstream {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/oauth2.0/authorize", get(mock_authorize))
        .route("/oauth2.0/token", post(mock_token))
        .route("/oauth2.0/me", get(mock_me))
        .route("/user/get_user_info", get(mock_user_info))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, state }
}

async fn mock_authorize(State(state): State<Arc<MockState>>, RawQuery(query): RawQuery) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_authorize_query.lock().unwrap() = query.clone();

    let location = format!("https://client.example/cb?{}", query.unwrap_or_default());
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::SET_COOKIE, "ui_key=abc; Path=/".to_string()),
        ],
        "redirecting",
    )
        .into_response()
}

async fn mock_token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_token_form.lock().unwrap() = form;

    let (status, body) = state.token_reply.lock().unwrap().clone();
    (status, Json(body)).into_response()
}

async fn mock_me(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let token = query.get("access_token").cloned().unwrap_or_default();
    if query.get("fmt").map(String::as_str) != Some("json") {
        return (StatusCode::OK, "callback( {} );").into_response();
    }
    if token.starts_with("revoked") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": 100016}))).into_response();
    }
    if token.starts_with("noopenid") {
        return Json(json!({"client_id": "abc"})).into_response();
    }
    Json(json!({"client_id": "abc", "openid": format!("OPENID-{}", token)})).into_response()
}

async fn mock_user_info(
    State(state): State<Arc<MockState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.last_user_info_query.lock().unwrap() = query;

    let status = *state.user_info_status.lock().unwrap();
    (
        status,
        Json(json!({
            "ret": 0,
            "msg": "",
            "nickname": "Alice",
            "figureurl_qq_2": "http://thirdqq.qlogo.cn/100",
            "gender": "女"
        })),
    )
        .into_response()
}

/// A proxy running against a mock upstream.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub registry: TokenRegistry,
    pub upstream: MockUpstream,
    shutdown: Shutdown,
}

impl TestProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a mock upstream and a proxy pointed at it.
pub async fn start_proxy() -> TestProxy {
    let upstream = start_mock_upstream().await;

    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = format!("http://{}", upstream.addr);

    let server = HttpServer::new(config).unwrap();
    let registry = server.registry();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        registry,
        upstream,
        shutdown,
    }
}

/// HTTP client that neither follows redirects nor uses system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
