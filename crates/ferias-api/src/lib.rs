//! JSON REST API for the ferias scheduler.
//!
//! Exposes an axum [`Router`] backed by any [`ferias_core::store::Backend`].
//! The handlers store what they are sent; business-day counts and
//! identifiers are computed by the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ferias_api::api_router(store.clone()))
//! ```

pub mod absences;
pub mod error;
pub mod login;
pub mod workers;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, patch, post},
};
use ferias_core::store::{Backend, MessageResponse};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: Backend + 'static,
{
  Router::new()
    // Login
    .route("/getloginferias", get(login::credentials::<S>))
    // Absences
    .route("/getferias", get(absences::list::<S>))
    .route("/postferias", post(absences::create::<S>))
    .route("/editferias/{id}", patch(absences::update::<S>))
    .route("/deleteferias/{id}", delete(absences::delete::<S>))
    // Workers
    .route("/novocolab", post(workers::create::<S>))
    .route("/editarColab/{id}", patch(workers::update::<S>))
    .route("/eliminarColab/{id}", delete(workers::delete::<S>))
    .with_state(store)
}

fn message(message: String) -> Json<MessageResponse> {
  Json(MessageResponse { message })
}
