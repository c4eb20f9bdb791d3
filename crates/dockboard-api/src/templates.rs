//! Handlers for the weekly-template endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/templates?day=N` | N = 1 (Monday) … 5 (Friday) |
//! | `POST`   | `/templates` | Body: `{"day_of_week": N, ...fields}` |
//! | `PATCH`  | `/templates/:id` | Partial field update |
//! | `DELETE` | `/templates/:id` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use dockboard_core::{
  calendar::Workday,
  roster::{NewTemplate, RosterPatch, TemplateRow},
  store::ScheduleStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, store_err};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub day: Workday,
}

/// `GET /templates?day=N`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<TemplateRow>>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let rows = store.list_templates(params.day).await.map_err(store_err)?;
  Ok(Json(rows))
}

/// `POST /templates`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewTemplate>,
) -> Result<(StatusCode, Json<TemplateRow>), ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let row = store.add_template(body).await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(row)))
}

/// `PATCH /templates/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(patch): Json<RosterPatch>,
) -> Result<Json<TemplateRow>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }
  let row = store.update_template(id, patch).await.map_err(store_err)?;
  Ok(Json(row))
}

/// `DELETE /templates/:id`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  store.delete_template(id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}
