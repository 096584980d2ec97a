//! Handlers for the worker roster endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/novocolab` | Body: `{"title","dep","color","avaDays","compH","lunchH"}` |
//! | `PATCH`  | `/editarColab/:id` | Any subset of the creation fields |
//! | `DELETE` | `/eliminarColab/:id` | Removes the worker and every absence they own |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use ferias_core::{
  store::{Backend, MessageResponse},
  worker::{NewWorker, WorkerUpdate},
};
use tracing::info;

use crate::{error::ApiError, message};

/// `POST /novocolab`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewWorker>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
{
  body.validate()?;
  let name = body.title.clone();
  store.create_worker(body).await.map_err(ApiError::from_store)?;
  info!(%name, "worker added");
  Ok((StatusCode::CREATED, message(format!("worker {name} created"))))
}

/// `PATCH /editarColab/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  Json(body): Json<WorkerUpdate>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: Backend,
{
  if body.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".to_owned()));
  }
  body.validate()?;
  store
    .update_worker(id.clone(), body)
    .await
    .map_err(ApiError::from_store)?;
  info!(%id, "worker updated");
  Ok(message(format!("worker {id} updated")))
}

/// `DELETE /eliminarColab/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError>
where
  S: Backend,
{
  store
    .delete_worker(id.clone())
    .await
    .map_err(ApiError::from_store)?;
  info!(%id, "worker removed");
  Ok(message(format!("worker {id} deleted")))
}
