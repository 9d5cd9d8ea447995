#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use http_body_util::BodyExt;
use jobboard::config::{ConfigV1, parse_config};
use jobboard::metrics::Metrics;
use jobboard::models::{Job, Role, User};
use jobboard::routes::create_router;
use jobboard::state::AppState;
use jobboard::store::create_store;
use jsonwebtoken::{DecodingKey, TokenData, Validation, decode};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: "127.0.0.1:0"
store:
  type: memory
jwt:
  secret: "integration-test-secret"
  iss: "jobboard-test"
  exp: 3600
password:
  cost: 4
logging:
  level: "debug"
  format: "json"
"#;

pub fn test_config() -> ConfigV1 {
    parse_config(TEST_CONFIG).expect("test config should parse")
}

/// The router plus the state behind it, so tests can seed rows directly.
pub async fn build_app() -> (Router, AppState) {
    let config = test_config();
    let store = create_store(&config.store)
        .await
        .expect("memory store should start");
    let metrics = Metrics::new().expect("metrics should register");
    let state = AppState::new(&config, store, metrics);
    (create_router(state.clone()), state)
}

/// Inserts a user with a real password hash and returns it with a token.
pub async fn seed_user(state: &AppState, email: &str, role: Role) -> (User, String) {
    let digest = state
        .auth
        .credentials
        .hash("password123")
        .expect("hashing should succeed");
    let user = User::new(email, digest, format!("Test {}", role), role);
    state.store.insert_user(&user).await.expect("insert user");
    let token = state.auth.credentials.issue(&user.id).expect("issue token");
    (user, token)
}

/// Inserts an approved, active job owned by `employer_id`.
pub async fn seed_approved_job(state: &AppState, employer_id: &str, title: &str) -> Job {
    let mut job = Job::new(
        employer_id,
        title.to_string(),
        "Build things".to_string(),
        Some("Remote".to_string()),
    );
    job.is_approved = true;
    state.store.insert_job(&job).await.expect("insert job");
    job
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("failed to build request")
}

/// A request with an `application/json` content type and an arbitrary,
/// possibly malformed, body.
pub fn raw_json_request(method: Method, path: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("failed to build request")
}

/// A request carrying `authorization` verbatim as its `Authorization` header.
pub fn request_with_authorization(path: &str, authorization: HeaderValue) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header("Authorization", authorization)
        .body(Body::empty())
        .expect("failed to build request")
}

/// Sends one request and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn decode_claims(token: &str) -> TokenData<Value> {
    let mut validation = Validation::default();
    validation.validate_aud = false;
    validation.set_issuer(&["jobboard-test"]);

    decode(
        token,
        &DecodingKey::from_secret(TEST_SECRET.as_ref()),
        &validation,
    )
    .expect("JWT should decode")
}
