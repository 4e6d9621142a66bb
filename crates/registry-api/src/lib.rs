//! JSON REST API for the property registry.
//!
//! Exposes an axum [`Router`] backed by any
//! [`registry_core::store::RecordStore`]. CORS, tracing and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = registry_api::api_router(Arc::new(store), ApiConfig::default());
//! ```

pub mod decode;
pub mod error;
pub mod extract;
pub mod records;

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
  Json, Router,
  extract::{DefaultBodyLimit, FromRef},
  http::{Method, StatusCode},
  response::{IntoResponse, Response},
  routing::{get, post, put},
};
use registry_core::{iin, store::RecordStore};
use serde_json::json;

pub use decode::{DEFAULT_BODY_LIMIT, DecodeError, decode_strict};
pub use error::ApiError;
pub use extract::{BodyLimit, StrictJson};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Knobs for the API layer.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Largest accepted request body in bytes.
  pub body_limit:    usize,
  /// Deadline for each store call.
  pub store_timeout: Duration,
  /// Reject create/update bodies whose `iin` fails validation.
  pub validate_iin:  bool,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      body_limit:    DEFAULT_BODY_LIMIT,
      store_timeout: Duration::from_secs(5),
      validate_iin:  true,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

impl<S> FromRef<ApiState<S>> for BodyLimit {
  fn from_ref(state: &ApiState<S>) -> Self { BodyLimit(state.config.body_limit) }
}

impl<S: RecordStore> ApiState<S> {
  pub fn new(store: Arc<S>, config: ApiConfig) -> Self {
    Self { store, config: Arc::new(config) }
  }

  /// Run one store operation under the configured deadline. The operation is
  /// not retried.
  pub async fn call<T>(
    &self,
    op: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T, ApiError> {
    tokio::time::timeout(self.config.store_timeout, op)
      .await
      .map_err(|_| ApiError::Timeout)?
      .map_err(ApiError::from_store)
  }

  /// Reject an identity number that fails validation, unless validation is
  /// switched off. The number itself is personal data and is neither echoed
  /// nor logged.
  pub fn check_iin(&self, code: &str) -> Result<(), ApiError> {
    if self.config.validate_iin && !iin::is_valid(code) {
      return Err(ApiError::Validation("invalid iin".to_owned()));
    }
    Ok(())
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested or layered by the caller.
pub fn api_router<S>(store: Arc<S>, config: ApiConfig) -> Router<()>
where
  S: RecordStore + 'static,
{
  let body_limit = config.body_limit;
  Router::new()
    .route("/", get(records::home))
    .route("/create", post(records::create::<S>))
    .route("/update", put(records::update::<S>))
    .route("/delete/{id}", get(records::soft_delete::<S>))
    .route("/records", get(records::list::<S>))
    .route("/records/{id}", get(records::get_one::<S>))
    .fallback(not_found)
    .method_not_allowed_fallback(method_not_allowed)
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(ApiState::new(store, config))
}

async fn not_found() -> Response {
  (
    StatusCode::NOT_FOUND,
    Json(json!({ "error": "requested data not found!" })),
  )
    .into_response()
}

async fn method_not_allowed(method: Method) -> Response {
  (
    StatusCode::METHOD_NOT_ALLOWED,
    Json(json!({ "message": format!("{method} is not implemented") })),
  )
    .into_response()
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{body::Body, http::Request, http::header};
  use registry_core::{
    StoreError, StoreErrorKind,
    record::{NewRecord, Record},
  };
  use registry_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  const VALID_IIN: &str = "920515350127";

  async fn app_with(config: ApiConfig) -> Router {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store), config)
  }

  async fn app() -> Router { app_with(ApiConfig::default()).await }

  fn record_body(iin: &str) -> Value {
    json!({
      "name":        "Aigerim",
      "surname":     "Sadykova",
      "middlename":  "Nurlanovna",
      "iin":         iin,
      "dom":         12,
      "kv":          4,
      "city":        "Almaty",
      "street":      "Abay avenue",
      "cadastr_num": "20-311-004-123",
      "area":        64.5,
      "lat":         43.238949,
      "long":        76.889709,
      "comment":     "",
    })
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   &str,
  ) -> (StatusCode, Value) {
    send_body(app, method, uri, Body::from(body.to_owned())).await
  }

  async fn send_body(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Body,
  ) -> (StatusCode, Value) {
    let req = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(body)
      .unwrap();
    let resp   = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes  = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value  = serde_json::from_slice(&bytes)
      .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
  }

  async fn create(app: &Router) -> i64 {
    let (status, body) =
      send(app, "POST", "/create", &record_body(VALID_IIN).to_string()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["record"]["id"].as_i64().unwrap()
  }

  // ── Home / routing ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn home_reports_running() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("status: Running".into()));
  }

  #[tokio::test]
  async fn unknown_route_returns_404() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/nope", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "requested data not found!");
  }

  #[tokio::test]
  async fn wrong_method_returns_405() {
    let app = app().await;
    let (status, body) = send(&app, "POST", "/records", "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["message"], "POST is not implemented");
  }

  // ── Create ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_then_get() {
    let app = app().await;
    let id  = create(&app).await;

    let (status, body) = send(&app, "GET", &format!("/records/{id}"), "").await;
    assert_eq!(status, StatusCode::OK);
    let record = &body["record"];
    assert_eq!(record["id"], id);
    assert_eq!(record["iin"], VALID_IIN);
    assert_eq!(record["middlename"], "Nurlanovna");
    assert_eq!(record["lat"], 43.238949);
    assert_eq!(record["status"], "ACTIVE_STATUS");
  }

  #[tokio::test]
  async fn create_rejects_invalid_iin() {
    let app = app().await;
    let (status, body) =
      send(&app, "POST", "/create", &record_body("920515350128").to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid iin");
    assert!(!body.to_string().contains("920515350128"));

    let (_, list) = send(&app, "GET", "/records", "").await;
    assert_eq!(list["records"], json!([]));
  }

  #[tokio::test]
  async fn iin_check_can_be_disabled() {
    let app = app_with(ApiConfig { validate_iin: false, ..ApiConfig::default() }).await;
    let (status, _) =
      send(&app, "POST", "/create", &record_body("000000000000").to_string()).await;
    assert_eq!(status, StatusCode::OK);
  }

  #[tokio::test]
  async fn create_rejects_client_supplied_id() {
    let app = app().await;
    let mut body = record_body(VALID_IIN);
    body["id"] = json!(77);
    let (status, resp) = send(&app, "POST", "/create", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "body contains unknown key \"id\"");
  }

  #[tokio::test]
  async fn create_rejects_multiple_values() {
    let app  = app().await;
    let one  = record_body(VALID_IIN).to_string();
    let (status, resp) = send(&app, "POST", "/create", &format!("{one}{one}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "body must only contain a single JSON value");
  }

  #[tokio::test]
  async fn create_rejects_oversized_body() {
    let app = app_with(ApiConfig { body_limit: 64, ..ApiConfig::default() }).await;
    let (status, resp) =
      send(&app, "POST", "/create", &record_body(VALID_IIN).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "body must not be larger than 64 bytes");
  }

  #[tokio::test]
  async fn create_reports_type_mismatch_field() {
    let app = app().await;
    let mut body = record_body(VALID_IIN);
    body["dom"] = json!("twelve");
    let (status, resp) = send(&app, "POST", "/create", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "body contains incorrect JSON type for field \"dom\"");
  }

  // ── Get ──────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn get_missing_returns_404() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/records/4242", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "record 4242 not found");
  }

  #[tokio::test]
  async fn non_numeric_id_returns_400() {
    let app = app().await;
    let (status, body) = send(&app, "GET", "/records/abc", "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid id");
  }

  // ── Update ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn update_replaces_fields() {
    let app = app().await;
    let id  = create(&app).await;

    let mut body = record_body(VALID_IIN);
    body["id"] = json!(id);
    body["street"] = json!("Dostyk avenue");
    body["status"] = json!("DELETED_STATUS");

    let (status, resp) = send(&app, "PUT", "/update", &body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["updated"]["street"], "Dostyk avenue");
    // Status is not an updatable field.
    assert_eq!(resp["updated"]["status"], "ACTIVE_STATUS");
  }

  #[tokio::test]
  async fn update_missing_returns_404() {
    let app = app().await;
    let mut body = record_body(VALID_IIN);
    body["id"] = json!(999);
    let (status, resp) = send(&app, "PUT", "/update", &body.to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(resp["error"], "record 999 not found");
  }

  // ── Delete / list ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn delete_hides_from_list_but_not_from_get() {
    let app  = app().await;
    let keep = create(&app).await;
    let gone = create(&app).await;

    let (status, body) = send(&app, "GET", &format!("/delete/{gone}"), "").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["deleted_record"]["status"], "DELETED_STATUS");

    // Second delete is not an error.
    let (status, body) = send(&app, "GET", &format!("/delete/{gone}"), "").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["deleted_record"]["id"], gone);

    let (_, list) = send(&app, "GET", "/records", "").await;
    let ids: Vec<i64> = list["records"]
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["id"].as_i64().unwrap())
      .collect();
    assert_eq!(ids, vec![keep]);

    let (status, body) = send(&app, "GET", &format!("/records/{gone}"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "DELETED_STATUS");
  }

  // ── Body and store failures ──────────────────────────────────────────────────

  #[tokio::test]
  async fn aborted_body_is_not_reported_as_oversized() {
    let app = app().await;
    let chunks: Vec<Result<&'static str, std::io::Error>> = vec![
      Ok("{\"name\":"),
      Err(std::io::Error::other("connection reset")),
    ];
    let body = Body::from_stream(futures::stream::iter(chunks));

    let (status, resp) = send_body(&app, "POST", "/create", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "body could not be read");
  }

  #[tokio::test]
  async fn unknown_status_on_update_names_the_field() {
    let app = app().await;
    let id  = create(&app).await;

    let mut body = record_body(VALID_IIN);
    body["id"] = json!(id);
    body["status"] = json!("ARCHIVED_STATUS");

    let (status, resp) = send(&app, "PUT", "/update", &body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
      resp["error"],
      "body contains incorrect JSON type for field \"status\""
    );
  }

  /// A backend failure whose text must never reach a client.
  #[derive(Debug, thiserror::Error)]
  #[error("connection to db-primary:5432 refused")]
  struct Unreachable;

  impl StoreError for Unreachable {
    fn kind(&self) -> StoreErrorKind { StoreErrorKind::Query }
  }

  /// Fails every call, optionally after stalling for `delay`.
  struct BrokenStore {
    delay: Option<Duration>,
  }

  impl BrokenStore {
    async fn fail<T>(&self) -> Result<T, Unreachable> {
      if let Some(delay) = self.delay {
        tokio::time::sleep(delay).await;
      }
      Err(Unreachable)
    }
  }

  impl RecordStore for BrokenStore {
    type Error = Unreachable;

    async fn create(&self, _: NewRecord) -> Result<Record, Unreachable> { self.fail().await }

    async fn update(&self, _: Record) -> Result<Record, Unreachable> { self.fail().await }

    async fn soft_delete(&self, _: i64) -> Result<Record, Unreachable> { self.fail().await }

    async fn list_active(&self) -> Result<Vec<Record>, Unreachable> { self.fail().await }

    async fn get_by_id(&self, _: i64) -> Result<Record, Unreachable> { self.fail().await }
  }

  #[tokio::test]
  async fn store_failure_is_opaque() {
    let app = api_router(Arc::new(BrokenStore { delay: None }), ApiConfig::default());

    for (method, uri, body) in [
      ("GET", "/records".to_owned(), String::new()),
      ("GET", "/records/1".to_owned(), String::new()),
      ("GET", "/delete/1".to_owned(), String::new()),
      ("POST", "/create".to_owned(), record_body(VALID_IIN).to_string()),
    ] {
      let (status, resp) = send(&app, method, &uri, &body).await;
      assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
      assert_eq!(resp, json!({ "error": "internal server error" }));
      assert!(!resp.to_string().contains("5432"));
    }
  }

  #[tokio::test]
  async fn slow_store_hits_the_deadline() {
    let config = ApiConfig {
      store_timeout: Duration::from_millis(20),
      ..ApiConfig::default()
    };
    let store = BrokenStore { delay: Some(Duration::from_secs(5)) };
    let app   = api_router(Arc::new(store), config);

    let (status, resp) = send(&app, "GET", "/records", "").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp["error"], "store did not respond in time");
  }
}
