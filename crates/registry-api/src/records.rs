//! Handlers for the record endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/create` | Body: [`NewRecord`]; returns `{"record": ...}` |
//! | `PUT`  | `/update` | Body: [`Record`]; `status` is ignored; returns `{"updated": ...}` |
//! | `GET`  | `/delete/{id}` | Soft delete; 202 + `{"deleted_record": ...}` |
//! | `GET`  | `/records` | Active records only; `{"records": [...]}` |
//! | `GET`  | `/records/{id}` | Any status; `{"record": ...}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use registry_core::{
  record::{NewRecord, Record},
  store::RecordStore,
};
use serde_json::{Value, json};

use crate::{ApiState, error::ApiError, extract::StrictJson};

fn parse_id(raw: &str) -> Result<i64, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest("invalid id".to_owned()))
}

// ─── Home ─────────────────────────────────────────────────────────────────────

/// `GET /` — liveness probe.
pub async fn home() -> &'static str { "status: Running" }

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /create`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  StrictJson(body): StrictJson<NewRecord>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  state.check_iin(&body.iin)?;
  let record = state.call(state.store.create(body)).await?;
  tracing::info!(id = record.id, "record created");
  Ok(Json(json!({ "record": record })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /update`
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  StrictJson(body): StrictJson<Record>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  state.check_iin(&body.iin)?;
  let updated = state.call(state.store.update(body)).await?;
  tracing::info!(id = updated.id, "record updated");
  Ok(Json(json!({ "updated": updated })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `GET /delete/{id}`
pub async fn soft_delete<S>(
  State(state): State<ApiState<S>>,
  Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore + 'static,
{
  let id = parse_id(&raw_id)?;
  let deleted = state.call(state.store.soft_delete(id)).await?;
  tracing::info!(id, "record deleted");
  Ok((StatusCode::ACCEPTED, Json(json!({ "deleted_record": deleted }))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /records`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  let records = state.call(state.store.list_active()).await?;
  Ok(Json(json!({ "records": records })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /records/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: RecordStore + 'static,
{
  let id = parse_id(&raw_id)?;
  let record = state.call(state.store.get_by_id(id)).await?;
  Ok(Json(json!({ "record": record })))
}
