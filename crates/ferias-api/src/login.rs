//! `GET /getloginferias`: the credential list the front end compares
//! against.

use std::sync::Arc;

use axum::{Json, extract::State};
use ferias_core::store::{Backend, CredentialsResponse};

use crate::error::ApiError;

pub async fn credentials<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<CredentialsResponse>, ApiError>
where
  S: Backend,
{
  let credentials = store.credentials().await.map_err(ApiError::from_store)?;
  Ok(Json(CredentialsResponse { credentials }))
}
