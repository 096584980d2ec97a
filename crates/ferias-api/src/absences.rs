//! Handlers for the roster listing and absence endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/getferias` | `{"workers":[...]}` with nested absences |
//! | `POST`   | `/postferias` | Body: `{"id":<workerId>,"absence":{...},"type":"vacation"\|"off-day"}` |
//! | `PATCH`  | `/editferias/:id` | Body: the full absence record; may carry a new id |
//! | `DELETE` | `/deleteferias/:id` | 404 if no worker owns the absence |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ferias_core::{
  absence::{AbsencePayload, NewAbsenceRequest},
  id::AbsenceId,
  store::{Backend, MessageResponse, WorkersResponse},
};
use tracing::info;

use crate::{error::ApiError, message};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /getferias`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<WorkersResponse>, ApiError>
where
  S: Backend,
{
  let workers = store.list_workers().await.map_err(ApiError::from_store)?;
  Ok(Json(WorkersResponse { workers }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /postferias`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAbsenceRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
{
  let id = body.absence.id.clone();
  store
    .create_absence(body)
    .await
    .map_err(ApiError::from_store)?;
  info!(%id, "absence stored");
  Ok((StatusCode::CREATED, message(format!("absence {id} created"))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /editferias/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<AbsencePayload>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: Backend,
{
  let new_id = body.id.clone();
  store
    .update_absence(AbsenceId::from(id.as_str()), body)
    .await
    .map_err(ApiError::from_store)?;
  info!(%id, %new_id, "absence replaced");
  Ok(message(format!("absence {new_id} updated")))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /deleteferias/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: Backend,
{
  store
    .delete_absence(AbsenceId::from(id.as_str()))
    .await
    .map_err(ApiError::from_store)?;
  info!(%id, "absence removed");
  Ok(message(format!("absence {id} deleted")))
}
