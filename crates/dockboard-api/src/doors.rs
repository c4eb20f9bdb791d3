//! Handlers for the dock-door view.
//!
//! The view is re-derived from scratch on every request; clients poll it on
//! a fixed interval and overwrite local state with the response.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/doors/:date` | Full dock picture: doors + in-yard pool |
//! | `POST` | `/doors/:date` | Body: `{"door_number", "trailer_id", "daily_assignment_id"?}` |
//! | `POST` | `/doors/:date/storage` | Pin the storage trailer to its door |
//! | `PUT`  | `/door-assignments/:id/move-status` | Body: `{"status": ...}` |
//! | `POST` | `/door-assignments/:id/clear` | Retire without departing |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use dockboard_core::{
  door::{
    DOOR_NUMBERS, DoorAssignment, MoveStatus, NewDoorAssignment, STORAGE_DOOR,
    STORAGE_TRAILER_NUMBER, YardTrailer,
  },
  entity::ReferenceCatalog,
  roster::{DailyAssignment, LoadingStatus},
  store::ScheduleStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, store_err};

// ─── Views ───────────────────────────────────────────────────────────────────

/// An occupied door with display labels and the attached route's loading
/// context joined in. Storage trailers carry no route context.
#[derive(Debug, Serialize)]
pub struct DoorOccupantView {
  #[serde(flatten)]
  pub door:             DoorAssignment,
  pub trailer_number:   Option<String>,
  pub route_code:       Option<String>,
  pub driver_name:      Option<String>,
  pub loading_status:   Option<LoadingStatus>,
  pub dispatch_display: Option<String>,
  /// True for a pinned storage trailer (no daily assignment).
  pub storage:          bool,
}

#[derive(Debug, Serialize)]
pub struct DoorSlotView {
  pub door_number: u8,
  pub occupant:    Option<DoorOccupantView>,
}

#[derive(Debug, Serialize)]
pub struct YardTrailerView {
  #[serde(flatten)]
  pub yard:             YardTrailer,
  pub trailer_number:   Option<String>,
  pub route_code:       Option<String>,
  pub dispatch_display: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DockView {
  pub date:       NaiveDate,
  pub occupied:   usize,
  pub empty:      usize,
  pub doors:      Vec<DoorSlotView>,
  pub unassigned: Vec<YardTrailerView>,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /doors/:date`
pub async fn snapshot<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DockView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let snapshot = store.dock_snapshot(date).await.map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  // Loading context for docked route trailers; the snapshot itself carries
  // only the occupancy records.
  let assignments: HashMap<Uuid, DailyAssignment> = store
    .list_finalized(date)
    .await
    .map_err(store_err)?
    .into_iter()
    .map(|a| (a.assignment_id, a))
    .collect();

  let occupied = snapshot.occupied_count();
  let empty = snapshot.empty_count();

  let mut occupants: HashMap<u8, DoorOccupantView> = snapshot
    .doors
    .into_iter()
    .map(|door| (door.door_number, occupant_view(door, &catalog, &assignments)))
    .collect();

  let doors = DOOR_NUMBERS
    .map(|door_number| DoorSlotView {
      door_number,
      occupant: occupants.remove(&door_number),
    })
    .collect();

  let unassigned = snapshot
    .unassigned
    .into_iter()
    .map(|yard| YardTrailerView {
      trailer_number:   catalog
        .trailer_number(Some(yard.trailer_id))
        .map(str::to_owned),
      route_code:       catalog.route_code(yard.route_id).map(str::to_owned),
      dispatch_display: yard.dispatch_time.map(|t| t.display()),
      yard,
    })
    .collect();

  Ok(Json(DockView { date, occupied, empty, doors, unassigned }))
}

fn occupant_view(
  door: DoorAssignment,
  catalog: &ReferenceCatalog,
  assignments: &HashMap<Uuid, DailyAssignment>,
) -> DoorOccupantView {
  let assignment = door
    .daily_assignment_id
    .and_then(|id| assignments.get(&id));
  DoorOccupantView {
    trailer_number:   catalog
      .trailer_number(Some(door.trailer_id))
      .map(str::to_owned),
    route_code:       assignment
      .and_then(|a| catalog.route_code(a.fields.route_id))
      .map(str::to_owned),
    driver_name:      assignment
      .and_then(|a| catalog.driver_name(a.fields.driver_id))
      .map(str::to_owned),
    loading_status:   assignment.map(|a| a.loading_status),
    dispatch_display: assignment
      .and_then(|a| a.fields.dispatch_time)
      .map(|t| t.display()),
    storage:          door.daily_assignment_id.is_none(),
    door,
  }
}

#[derive(Debug, Deserialize)]
pub struct AssignDoorBody {
  pub door_number:         u8,
  pub trailer_id:          Uuid,
  #[serde(default)]
  pub daily_assignment_id: Option<Uuid>,
}

/// `POST /doors/:date`
pub async fn assign<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
  Json(body): Json<AssignDoorBody>,
) -> Result<(StatusCode, Json<DoorAssignment>), ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let door = store
    .assign_door(NewDoorAssignment {
      date,
      door_number:         body.door_number,
      trailer_id:          body.trailer_id,
      daily_assignment_id: body.daily_assignment_id,
    })
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(door)))
}

/// `POST /doors/:date/storage` — pin the storage trailer to its usual door
/// with no route attached.
pub async fn pin_storage<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<(StatusCode, Json<DoorAssignment>), ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let trailer = store
    .find_trailer(STORAGE_TRAILER_NUMBER)
    .await
    .map_err(store_err)?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "trailer {STORAGE_TRAILER_NUMBER} is not in the system"
      ))
    })?;
  let door = store
    .assign_door(NewDoorAssignment {
      date,
      door_number:         STORAGE_DOOR,
      trailer_id:          trailer.trailer_id,
      daily_assignment_id: None,
    })
    .await
    .map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(door)))
}

#[derive(Debug, Deserialize)]
pub struct MoveStatusBody {
  pub status: MoveStatus,
}

/// `PUT /door-assignments/:id/move-status` — free-form transitions;
/// `departed` retires the assignment and frees the door.
pub async fn set_move_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<MoveStatusBody>,
) -> Result<Json<DoorAssignment>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let door = store
    .set_move_status(id, body.status)
    .await
    .map_err(store_err)?;
  Ok(Json(door))
}

/// `POST /door-assignments/:id/clear`
pub async fn clear<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DoorAssignment>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let door = store.clear_door(id).await.map_err(store_err)?;
  Ok(Json(door))
}
