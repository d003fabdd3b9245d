//! Router tests against an in-memory SQLite backend.

use std::{sync::Arc, time::Duration};

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use gigboard_core::{identity::Credentials, store::IdentityProvider};
use gigboard_session::{ProfileLookup, RetryPolicy, SessionManager};
use gigboard_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::{AppState, api_router};

type State = AppState<SqliteStore, SqliteStore>;

async fn make_state() -> (Arc<SqliteStore>, State) {
  state_with(RetryPolicy {
    profile_retry:        Duration::from_millis(20),
    max_profile_attempts: Some(2),
  })
  .await
}

async fn state_with(policy: RetryPolicy) -> (Arc<SqliteStore>, State) {
  let store   = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let session = SessionManager::new(store.clone(), store.clone(), ProfileLookup::default());
  (store, AppState::new(Arc::new(session), policy))
}

async fn send(
  state:  &State,
  method: &str,
  uri:    &str,
  body:   Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp   = api_router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value  = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn register(state: &State, email: &str, name: &str, role: &str) -> Value {
  let (status, identity) = send(
    state,
    "POST",
    "/session/register",
    Some(json!({
      "email": email,
      "password": "secret1",
      "name": name,
      "phone": "555-0100",
      "role": role,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "register {email}: {identity}");
  identity
}

async fn logout(state: &State) {
  let (status, _) = send(state, "POST", "/session/logout", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
}

fn clean_yard() -> Value {
  json!({
    "title": "Clean yard",
    "description": "Rake leaves and mow",
    "salary": "50",
    "category": "outdoor",
  })
}

// ── Session ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn signed_out_session() {
  let (_store, state) = make_state().await;

  let (status, body) = send(&state, "GET", "/session", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["identity"], Value::Null);
  assert_eq!(body["nav"], json!({ "primary": "join", "logout_visible": false }));

  for uri in ["/dashboard", "/jobs", "/applications"] {
    let (status, body) = send(&state, "GET", uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    assert!(body["error"].is_string());
  }
}

#[tokio::test]
async fn register_reports_session_and_view() {
  let (_store, state) = make_state().await;
  let identity = register(&state, "alice@x.com", "Alice", "employee").await;
  assert_eq!(identity["email"], "alice@x.com");

  let (_, session) = send(&state, "GET", "/session", None).await;
  assert_eq!(session["identity"], identity);
  assert_eq!(session["profile"]["userType"], "employee");
  assert_eq!(session["nav"]["primary"], "dashboard");

  let (status, view) = send(&state, "GET", "/dashboard", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["role"], "employee");
  assert_eq!(view["welcome"], "Welcome, Alice (employee)");
  assert_eq!(view["available_jobs"], json!([]));
}

#[tokio::test]
async fn registration_errors_map_to_status_codes() {
  let (_store, state) = make_state().await;

  let (status, _) = send(
    &state,
    "POST",
    "/session/register",
    Some(json!({
      "email": "a@x.com", "password": "123", "name": "A", "phone": "", "role": "employee",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  register(&state, "a@x.com", "A", "employee").await;
  let (status, body) = send(
    &state,
    "POST",
    "/session/register",
    Some(json!({
      "email": "a@x.com", "password": "secret1", "name": "A", "phone": "", "role": "employer",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("a@x.com"));
}

#[tokio::test]
async fn login_and_logout() {
  let (_store, state) = make_state().await;
  register(&state, "bob@x.com", "Bob", "employer").await;
  logout(&state).await;

  let (status, _) = send(
    &state,
    "POST",
    "/session/login",
    Some(json!({ "email": "bob@x.com", "password": "wrong-one" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, identity) = send(
    &state,
    "POST",
    "/session/login",
    Some(json!({ "email": "bob@x.com", "password": "secret1" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(identity["email"], "bob@x.com");

  let (status, view) = send(&state, "GET", "/dashboard", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["role"], "employer");
}

#[tokio::test]
async fn missing_profile_is_service_unavailable() {
  let (store, state) = make_state().await;
  store.create_account(&Credentials::new("ghost@x.com", "secret1")).await.unwrap();

  let mut rx = state.session.subscribe();
  rx.wait_for(|s| s.identity.is_some()).await.unwrap();

  let (status, _) = send(&state, "GET", "/dashboard", None).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn signing_out_mid_request_is_unauthorized() {
  let (store, state) = state_with(RetryPolicy {
    profile_retry:        Duration::from_millis(200),
    max_profile_attempts: Some(2),
  })
  .await;
  store.create_account(&Credentials::new("ghost@x.com", "secret1")).await.unwrap();
  let mut rx = state.session.subscribe();
  rx.wait_for(|s| s.identity.is_some()).await.unwrap();

  let session = state.session.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(20)).await;
    session.logout().await.unwrap();
  });

  let (status, _) = send(&state, "GET", "/dashboard", None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn oversized_attempt_limit_does_not_overflow() {
  let (_store, state) = state_with(RetryPolicy {
    profile_retry:        Duration::from_secs(u64::MAX / 2),
    max_profile_attempts: Some(u32::MAX),
  })
  .await;
  assert_eq!(state.request_budget(), Duration::MAX);

  register(&state, "alice@x.com", "Alice", "employee").await;
  let (status, view) = send(&state, "GET", "/dashboard", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(view["role"], "employee");
}

#[tokio::test]
async fn reserved_registration_field_is_bad_request() {
  let (_store, state) = make_state().await;
  let (status, body) = send(
    &state,
    "POST",
    "/session/register",
    Some(json!({
      "email": "m@x.com", "password": "secret1", "name": "M", "phone": "", "role": "employee",
      "extra": { "userType": "employer" },
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("userType"));

  let (_, session) = send(&state, "GET", "/session", None).await;
  assert_eq!(session["identity"], Value::Null);
}

// ── Jobs and applications ────────────────────────────────────────────────────

#[tokio::test]
async fn post_apply_accept_flow() {
  let (_store, state) = make_state().await;

  register(&state, "bob@x.com", "Bob", "employer").await;
  let (status, job) = send(&state, "POST", "/jobs", Some(clean_yard())).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(job["employerName"], "Bob");
  let job_id = job["id"].as_str().unwrap().to_owned();
  logout(&state).await;

  register(&state, "alice@x.com", "Alice", "employee").await;
  let (_, jobs) = send(&state, "GET", "/jobs", None).await;
  assert_eq!(jobs.as_array().unwrap().len(), 1);

  let (status, application) =
    send(&state, "POST", &format!("/jobs/{job_id}/apply"), None).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(application["status"], "pending");
  let application_id = application["id"].as_str().unwrap().to_owned();

  let (status, _) = send(&state, "POST", &format!("/jobs/{job_id}/apply"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(&state, "POST", "/jobs", Some(clean_yard())).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (_, mine) = send(&state, "GET", "/applications", None).await;
  assert_eq!(mine.as_array().unwrap().len(), 1);
  assert!(mine[0].get("actions").is_none());
  logout(&state).await;

  send(
    &state,
    "POST",
    "/session/login",
    Some(json!({ "email": "bob@x.com", "password": "secret1" })),
  )
  .await;

  let (_, received) = send(&state, "GET", "/applications", None).await;
  assert_eq!(received[0]["employeeName"], "Alice");
  assert_eq!(received[0]["actions"], json!(["accept", "reject"]));

  let status_uri = format!("/applications/{application_id}/status");
  let (status, updated) =
    send(&state, "POST", &status_uri, Some(json!({ "status": "accepted" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["status"], "accepted");

  let (_, received) = send(&state, "GET", "/applications", None).await;
  assert_eq!(received[0]["status"], "accepted");
  assert_eq!(received[0]["actions"], json!([]));

  let (status, _) =
    send(&state, "POST", &status_uri, Some(json!({ "status": "rejected" }))).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_requires_confirmation() {
  let (_store, state) = make_state().await;
  register(&state, "bob@x.com", "Bob", "employer").await;

  let (_, job) = send(&state, "POST", "/jobs", Some(clean_yard())).await;
  let job_uri = format!("/jobs/{}", job["id"].as_str().unwrap());

  let (status, _) = send(&state, "DELETE", &job_uri, None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  let (_, jobs) = send(&state, "GET", "/jobs", None).await;
  assert_eq!(jobs.as_array().unwrap().len(), 1);

  let (status, _) = send(&state, "DELETE", &format!("{job_uri}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (_, jobs) = send(&state, "GET", "/jobs", None).await;
  assert_eq!(jobs, json!([]));

  let (status, _) = send(&state, "DELETE", &format!("{job_uri}?confirm=true"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_title_is_bad_request() {
  let (_store, state) = make_state().await;
  register(&state, "bob@x.com", "Bob", "employer").await;

  let mut form = clean_yard();
  form["title"] = json!("");
  let (status, body) = send(&state, "POST", "/jobs", Some(form)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("title"));
}
