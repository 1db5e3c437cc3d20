use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Echo, MockConfig, Profile};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<&str>) -> Request<String> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, token);
    match body {
        Some(body) => builder
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .unwrap(),
        None => builder.body(String::new()).unwrap(),
    }
}

fn fixed_token(token: &str) -> MockConfig {
    MockConfig {
        token: Some(token.to_string()),
        ..MockConfig::default()
    }
}

// --- login ---

#[tokio::test]
async fn login_issues_configured_token() {
    let resp = app_with(fixed_token("abc123"))
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"alice","password":"wonderland"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["token"], "abc123");
}

#[tokio::test]
async fn login_issues_uuid_token_by_default() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"alice","password":"wonderland"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    let token = body["token"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(token).is_ok());
}

#[tokio::test]
async fn login_wrong_password_returns_plain_401() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/login",
            r#"{"username":"alice","password":"nope"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_bytes(resp).await.as_ref(), b"invalid credentials");
}

// --- echo / mirror / fixtures ---

#[tokio::test]
async fn echo_reports_headers_and_body() {
    let resp = app()
        .oneshot(authed("PUT", "/echo", "tok", Some(r#"{"a":1}"#)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.authorization.as_deref(), Some("tok"));
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    assert_eq!(echo.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn echo_without_body_reports_nothing() {
    let resp = app()
        .oneshot(Request::builder().uri("/echo").body(String::new()).unwrap())
        .await
        .unwrap();

    let echo: Echo = body_json(resp).await;
    assert_eq!(echo.method, "GET");
    assert!(echo.authorization.is_none());
    assert!(echo.content_type.is_none());
    assert!(echo.body.is_empty());
}

#[tokio::test]
async fn mirror_returns_body_verbatim() {
    let resp = app()
        .oneshot(json_request("POST", "/mirror", r#"{"x":[1,2,3]}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.as_ref(), br#"{"x":[1,2,3]}"#);
}

#[tokio::test]
async fn created_fixture_sends_repeated_header() {
    let resp = app()
        .oneshot(json_request("POST", "/fixtures/created", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let values: Vec<_> = resp
        .headers()
        .get_all("x-custom")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(values, ["a", "b"]);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["id"], 42);
}

#[tokio::test]
async fn broken_fixture_returns_500_text() {
    let resp = app()
        .oneshot(Request::builder().uri("/fixtures/broken").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await.as_ref(), b"internal error");
}

// --- profile ---

#[tokio::test]
async fn profile_rejects_unknown_token() {
    let resp = app()
        .oneshot(authed("GET", "/profile", "forged", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn profile_accepts_issued_token() {
    let mut app = app_with(fixed_token("abc123")).into_service();

    // before login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/profile", "abc123", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/login",
            r#"{"username":"alice","password":"wonderland"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // after login
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/profile", "abc123", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let profile: Profile = body_json(resp).await;
    assert_eq!(profile.username, "alice");

    // a "Bearer " prefix is not the issued token
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/profile", "Bearer abc123", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
