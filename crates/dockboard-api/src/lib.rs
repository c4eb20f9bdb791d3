//! JSON REST API for dockboard.
//!
//! Exposes an axum [`Router`] backed by any
//! [`dockboard_core::store::ScheduleStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", dockboard_api::api_router(store.clone()))
//! ```

pub mod days;
pub mod doors;
pub mod entities;
pub mod error;
pub mod loading;
pub mod planning;
pub mod templates;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post, put},
};
use dockboard_core::store::ScheduleStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ScheduleStore + 'static,
  S::Error: Into<dockboard_core::Error>,
{
  Router::new()
    // Reference entities
    .route("/drivers", get(entities::list_drivers::<S>).post(entities::create_driver::<S>))
    .route("/trucks", get(entities::list_trucks::<S>).post(entities::create_truck::<S>))
    .route("/trailers", get(entities::list_trailers::<S>).post(entities::create_trailer::<S>))
    .route("/loaders", get(entities::list_loaders::<S>).post(entities::create_loader::<S>))
    .route("/routes", get(entities::list_routes::<S>).post(entities::create_route::<S>))
    // Weekly templates
    .route("/templates", get(templates::list::<S>).post(templates::create::<S>))
    .route(
      "/templates/{id}",
      patch(templates::update::<S>).delete(templates::remove::<S>),
    )
    // Day lifecycle
    .route("/days/{date}", get(days::get_day::<S>))
    .route("/days/{date}/rows", post(days::add_row::<S>))
    .route(
      "/days/{date}/rows/{id}",
      patch(days::edit_row::<S>).delete(days::delete_row::<S>),
    )
    .route("/days/{date}/finalize", post(days::finalize::<S>))
    .route("/days/{date}/unfinalize", post(days::unfinalize::<S>))
    .route("/days/{date}/reset", post(days::reset::<S>))
    // Loading board
    .route("/loading/{date}", get(loading::board::<S>))
    .route("/assignments/{id}/loading-status", put(loading::set_status::<S>))
    .route("/assignments/{id}/crew", post(loading::add_crew::<S>))
    .route(
      "/assignments/{id}/crew/{crew_id}",
      delete(loading::remove_crew::<S>),
    )
    // Dock doors
    .route("/doors/{date}", get(doors::snapshot::<S>).post(doors::assign::<S>))
    .route("/doors/{date}/storage", post(doors::pin_storage::<S>))
    .route(
      "/door-assignments/{id}/move-status",
      put(doors::set_move_status::<S>),
    )
    .route("/door-assignments/{id}/clear", post(doors::clear::<S>))
    // Planning grid
    .route("/planning/workweeks", get(planning::workweeks::<S>))
    .with_state(store)
}
