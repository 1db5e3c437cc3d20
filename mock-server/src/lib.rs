use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Credentials accepted by `/login` and the token it hands out.
///
/// With `token` unset every successful login issues a fresh UUID.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub username: String,
    pub password: String,
    pub token: Option<String>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            username: "alice".to_string(),
            password: "wonderland".to_string(),
            token: None,
        }
    }
}

impl MockConfig {
    /// Read `MOCK_USERNAME`, `MOCK_PASSWORD` and `MOCK_TOKEN`, falling back
    /// to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            username: std::env::var("MOCK_USERNAME").unwrap_or(defaults.username),
            password: std::env::var("MOCK_PASSWORD").unwrap_or(defaults.password),
            token: std::env::var("MOCK_TOKEN").ok(),
        }
    }
}

/// Who a token belongs to, as reported by `/profile`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Issued tokens map to the username that logged in.
#[derive(Clone)]
pub struct AppState {
    config: Arc<MockConfig>,
    sessions: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    fn new(config: MockConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::default(),
        }
    }
}

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/echo", any(echo))
        .route("/mirror", any(mirror))
        .route("/fixtures/created", post(created_fixture))
        .route("/fixtures/broken", any(broken_fixture))
        .route("/profile", get(profile))
        .with_state(AppState::new(config))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

async fn login(State(state): State<AppState>, Json(input): Json<LoginRequest>) -> Response {
    if input.username != state.config.username || input.password != state.config.password {
        tracing::info!(username = %input.username, "rejected login");
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }
    let token = state
        .config
        .token
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    state
        .sessions
        .write()
        .await
        .insert(token.clone(), input.username.clone());
    tracing::info!(username = %input.username, "issued token");
    Json(json!({ "token": token })).into_response()
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    };
    Json(Echo {
        method: method.to_string(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn mirror(body: Bytes) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

async fn created_fixture() -> impl IntoResponse {
    (
        StatusCode::CREATED,
        AppendHeaders([("x-custom", "a"), ("x-custom", "b")]),
        Json(json!({ "id": 42 })),
    )
}

async fn broken_fixture() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// Only a token previously issued by `/login`, sent as the raw
/// `Authorization` value, is accepted.
async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    match state.sessions.read().await.get(token) {
        Some(username) => Json(Profile {
            username: username.clone(),
        })
        .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized" })),
        )
            .into_response(),
    }
}
