//! JSON REST API for the student roster.
//!
//! Exposes an axum [`Router`] backed by a [`Roster`] over any
//! [`StudentStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(roster.clone()))
//! ```

pub mod error;
pub mod extract;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{CredentialHasher, Roster, StudentStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `roster`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, H>(roster: Arc<Roster<S, H>>) -> Router<()>
where
  S: StudentStore + 'static,
  H: CredentialHasher + 'static,
{
  Router::new()
    .route(
      "/students",
      get(students::list_active::<S, H>).post(students::create::<S, H>),
    )
    .route("/students/all", get(students::list_all::<S, H>))
    .route("/students/search", get(students::search::<S, H>))
    .route(
      "/students/{id}",
      get(students::get_one::<S, H>)
        .put(students::update::<S, H>)
        .delete(students::soft_delete::<S, H>),
    )
    .route(
      "/students/{id}/restore",
      post(students::restore::<S, H>).patch(students::restore::<S, H>),
    )
    .route(
      "/students/{id}/profile",
      get(students::get_one::<S, H>).put(students::update_profile::<S, H>),
    )
    .with_state(roster)
}
