//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use dockboard_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Map a backend error into the response taxonomy. Handlers call this through
/// [`store_err`] so the status mapping lives in one place.
impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    use CoreError as E;
    match e {
      E::TemplateNotFound(_)
      | E::AssignmentNotFound(_)
      | E::DoorNotFound(_)
      | E::LoaderNotFound(_)
      | E::CrewNotFound(_)
      | E::TrailerNotFound(_) => ApiError::NotFound(e.to_string()),

      E::EmptyRoster(_) | E::TemplateSourcedRow(_) => {
        ApiError::Unprocessable(e.to_string())
      }

      E::AlreadyMaterialized(_)
      | E::DayFinalized(_)
      | E::DoorOccupied { .. }
      | E::TrailerAlreadyDocked(_)
      | E::DuplicateCrewMember { .. } => ApiError::Conflict(e.to_string()),

      E::InvalidDoor(_) | E::InvalidWeekday(_) | E::InvalidTime(_) => {
        ApiError::BadRequest(e.to_string())
      }

      E::Storage(msg) => ApiError::Store(msg.into()),
    }
  }
}

/// Convert any store error (via the core taxonomy) into an [`ApiError`].
pub fn store_err<E: Into<CoreError>>(e: E) -> ApiError { ApiError::from(e.into()) }

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
