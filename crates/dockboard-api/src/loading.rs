//! Handlers for the warehouse loading board.
//!
//! The board shows the finalized roster for a delivery date with crew and
//! door context: tonight's loading prepares the next business day's routes.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/loading/:date?sort=dispatch_time\|route_code` | |
//! | `PUT`    | `/assignments/:id/loading-status` | Body: `{"status": ...}` |
//! | `POST`   | `/assignments/:id/crew` | Body: `{"loader_id": ...}` |
//! | `DELETE` | `/assignments/:id/crew/:crew_id` | |

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use dockboard_core::{
  door::MoveStatus,
  entity::{EntityStatus, Loader, ReferenceCatalog},
  roster::{CrewAssignment, DailyAssignment, LoadingStatus},
  store::ScheduleStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  days::AssignmentView,
  error::{ApiError, store_err},
};

// ─── Views ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CrewMemberView {
  pub crew_id:   Uuid,
  pub loader_id: Uuid,
  pub name:      Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DoorSummary {
  pub door_id:     Uuid,
  pub door_number: u8,
  pub move_status: MoveStatus,
}

#[derive(Debug, Serialize)]
pub struct LoadingEntry {
  #[serde(flatten)]
  pub view: AssignmentView,
  pub crew: Vec<CrewMemberView>,
  pub door: Option<DoorSummary>,
}

#[derive(Debug, Default, Serialize)]
pub struct LoadingProgress {
  pub not_started: usize,
  pub in_progress: usize,
  pub loaded:      usize,
  pub total:       usize,
}

#[derive(Debug, Serialize)]
pub struct LoadingBoard {
  pub date:     NaiveDate,
  pub progress: LoadingProgress,
  pub entries:  Vec<LoadingEntry>,
  /// The active loader pool; clients subtract each entry's crew to offer
  /// the available remainder.
  pub loaders:  Vec<Loader>,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardSort {
  #[default]
  DispatchTime,
  RouteCode,
}

#[derive(Debug, Deserialize)]
pub struct BoardParams {
  #[serde(default)]
  pub sort: BoardSort,
}

/// `GET /loading/:date`
pub async fn board<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
  Query(params): Query<BoardParams>,
) -> Result<Json<LoadingBoard>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let assignments = store.list_finalized(date).await.map_err(store_err)?;
  let crew_rows = store.list_crew(date).await.map_err(store_err)?;
  let snapshot = store.dock_snapshot(date).await.map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  let loaders = store
    .list_loaders(Some(EntityStatus::Active))
    .await
    .map_err(store_err)?;

  let mut crews: HashMap<Uuid, Vec<CrewAssignment>> = HashMap::new();
  for row in crew_rows {
    crews.entry(row.assignment_id).or_default().push(row);
  }

  let doors: HashMap<Uuid, DoorSummary> = snapshot
    .doors
    .into_iter()
    .filter_map(|d| {
      let assignment_id = d.daily_assignment_id?;
      Some((assignment_id, DoorSummary {
        door_id:     d.door_id,
        door_number: d.door_number,
        move_status: d.move_status,
      }))
    })
    .collect();

  let mut progress = LoadingProgress { total: assignments.len(), ..Default::default() };
  for a in &assignments {
    match a.loading_status {
      LoadingStatus::NotStarted => progress.not_started += 1,
      LoadingStatus::InProgress => progress.in_progress += 1,
      LoadingStatus::Loaded => progress.loaded += 1,
    }
  }

  let mut entries: Vec<LoadingEntry> = assignments
    .into_iter()
    .map(|a| entry_view(a, &catalog, &mut crews, &doors))
    .collect();

  match params.sort {
    BoardSort::DispatchTime => entries.sort_by_key(|e| {
      let time = e.view.assignment.fields.dispatch_time;
      (time.is_none(), time, e.view.assignment.sort_order)
    }),
    BoardSort::RouteCode => entries.sort_by(|a, b| {
      let key = |e: &LoadingEntry| (e.view.route_code.is_none(), e.view.route_code.clone());
      key(a).cmp(&key(b))
    }),
  }

  Ok(Json(LoadingBoard { date, progress, entries, loaders }))
}

fn entry_view(
  assignment: DailyAssignment,
  catalog: &ReferenceCatalog,
  crews: &mut HashMap<Uuid, Vec<CrewAssignment>>,
  doors: &HashMap<Uuid, DoorSummary>,
) -> LoadingEntry {
  let crew = crews
    .remove(&assignment.assignment_id)
    .unwrap_or_default()
    .into_iter()
    .map(|c| CrewMemberView {
      crew_id:   c.crew_id,
      loader_id: c.loader_id,
      name:      catalog.loader_name(c.loader_id).map(str::to_owned),
    })
    .collect();
  let door = doors.get(&assignment.assignment_id).map(|d| DoorSummary {
    door_id:     d.door_id,
    door_number: d.door_number,
    move_status: d.move_status,
  });
  LoadingEntry { view: AssignmentView::new(assignment, catalog), crew, door }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusBody {
  pub status: LoadingStatus,
}

/// `PUT /assignments/:id/loading-status`
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<SetStatusBody>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let assignment = store
    .set_loading_status(id, body.status)
    .await
    .map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok(Json(AssignmentView::new(assignment, &catalog)))
}

#[derive(Debug, Deserialize)]
pub struct AddCrewBody {
  pub loader_id: Uuid,
}

/// `POST /assignments/:id/crew` — the first crew member of a not-started
/// assignment flips its loading status to in-progress.
pub async fn add_crew<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AddCrewBody>,
) -> Result<(StatusCode, Json<CrewMemberView>), ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let crew = store
    .add_crew_member(id, body.loader_id)
    .await
    .map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  let view = CrewMemberView {
    crew_id:   crew.crew_id,
    loader_id: crew.loader_id,
    name:      catalog.loader_name(crew.loader_id).map(str::to_owned),
  };
  Ok((StatusCode::CREATED, Json(view)))
}

/// `DELETE /assignments/:id/crew/:crew_id` — loading status never reverts.
pub async fn remove_crew<S>(
  State(store): State<Arc<S>>,
  Path((_id, crew_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  store.remove_crew_member(crew_id).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}
