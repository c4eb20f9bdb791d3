//! Handlers for the day-roster lifecycle.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/days/:date` | Resolved roster (template-backed or materialized) |
//! | `POST`   | `/days/:date/rows` | Add an empty route row (promotes first if virtual) |
//! | `PATCH`  | `/days/:date/rows/:id` | Field edit; body carries the row source |
//! | `DELETE` | `/days/:date/rows/:id?source=` | Materialized rows only |
//! | `POST`   | `/days/:date/finalize` / `unfinalize` / `reset` | Whole-date actions |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use dockboard_core::{
  calendar::{self, Workday},
  entity::ReferenceCatalog,
  roster::{
    AssignmentKind, DailyAssignment, DayRoster, RosterPatch, RosterRow,
    RosterSource, RowRef,
  },
  store::ScheduleStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, store_err};

// ─── Views ───────────────────────────────────────────────────────────────────

/// A roster row with reference labels joined in for display.
#[derive(Debug, Serialize)]
pub struct RosterRowView {
  #[serde(flatten)]
  pub row:              RosterRow,
  pub route_code:       Option<String>,
  pub driver_name:      Option<String>,
  pub truck_number:     Option<String>,
  pub trailer_number:   Option<String>,
  pub equipment:        Option<String>,
  pub dispatch_display: Option<String>,
}

impl RosterRowView {
  pub fn new(row: RosterRow, catalog: &ReferenceCatalog) -> Self {
    let route_code = catalog.route_code(row.fields.route_id).map(str::to_owned);
    let driver_name = catalog.driver_name(row.fields.driver_id).map(str::to_owned);
    let truck_number = catalog.truck_number(row.fields.truck_id).map(str::to_owned);
    let trailer_number =
      catalog.trailer_number(row.fields.trailer_id).map(str::to_owned);
    let equipment =
      catalog.equipment_label(row.fields.truck_id, row.fields.trailer_id);
    let dispatch_display = row.fields.dispatch_time.map(|t| t.display());
    Self {
      row,
      route_code,
      driver_name,
      truck_number,
      trailer_number,
      equipment,
      dispatch_display,
    }
  }
}

/// The resolved day, labels included.
#[derive(Debug, Serialize)]
pub struct DayView {
  pub date:          NaiveDate,
  pub day_name:      Option<&'static str>,
  /// The delivery date this roster prepares (next business day).
  pub delivery_date: NaiveDate,
  pub materialized:  bool,
  pub finalized:     bool,
  pub rows:          Vec<RosterRowView>,
}

impl DayView {
  pub fn new(roster: DayRoster, catalog: &ReferenceCatalog) -> Self {
    Self {
      date:          roster.date,
      day_name:      Workday::of(roster.date).map(Workday::name),
      delivery_date: calendar::next_business_day(roster.date),
      materialized:  roster.materialized,
      finalized:     roster.finalized,
      rows:          roster
        .rows
        .into_iter()
        .map(|row| RosterRowView::new(row, catalog))
        .collect(),
    }
  }
}

/// A daily assignment with reference labels joined in for display.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
  #[serde(flatten)]
  pub assignment:       DailyAssignment,
  pub route_code:       Option<String>,
  pub driver_name:      Option<String>,
  pub truck_number:     Option<String>,
  pub trailer_number:   Option<String>,
  pub equipment:        Option<String>,
  pub dispatch_display: Option<String>,
}

impl AssignmentView {
  pub fn new(assignment: DailyAssignment, catalog: &ReferenceCatalog) -> Self {
    let fields = &assignment.fields;
    let route_code = catalog.route_code(fields.route_id).map(str::to_owned);
    let driver_name = catalog.driver_name(fields.driver_id).map(str::to_owned);
    let truck_number = catalog.truck_number(fields.truck_id).map(str::to_owned);
    let trailer_number = catalog.trailer_number(fields.trailer_id).map(str::to_owned);
    let equipment = catalog.equipment_label(fields.truck_id, fields.trailer_id);
    let dispatch_display = fields.dispatch_time.map(|t| t.display());
    Self {
      assignment,
      route_code,
      driver_name,
      truck_number,
      trailer_number,
      equipment,
      dispatch_display,
    }
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /days/:date`
pub async fn get_day<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DayView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let roster = store.resolve_day(date).await.map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok(Json(DayView::new(roster, &catalog)))
}

#[derive(Debug, Deserialize)]
pub struct EditRowBody {
  pub source: RosterSource,
  #[serde(flatten)]
  pub patch:  RosterPatch,
}

/// `PATCH /days/:date/rows/:id` — body: `{"source": "template"|"assignment",
/// ...fields}`. An absent field is untouched; an explicit `null` clears it.
pub async fn edit_row<S>(
  State(store): State<Arc<S>>,
  Path((date, id)): Path<(NaiveDate, Uuid)>,
  Json(body): Json<EditRowBody>,
) -> Result<Json<AssignmentView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  if body.patch.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".into()));
  }
  let row = match body.source {
    RosterSource::Template => RowRef::Template(id),
    RosterSource::Assignment => RowRef::Assignment(id),
  };
  let assignment = store
    .edit_day_row(date, row, body.patch)
    .await
    .map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok(Json(AssignmentView::new(assignment, &catalog)))
}

#[derive(Debug, Default, Deserialize)]
pub struct AddRowBody {
  #[serde(default)]
  pub kind: AssignmentKind,
}

/// `POST /days/:date/rows` — append an empty draft row, promoting the day
/// first if it is still template-backed. The body is optional; it may name
/// the dispatch kind (`standard`, `help`, `dock`, `van`).
pub async fn add_row<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
  body: Option<Json<AddRowBody>>,
) -> Result<(StatusCode, Json<AssignmentView>), ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let kind = body.map(|Json(b)| b.kind).unwrap_or_default();
  let assignment = store
    .append_assignment(date, kind)
    .await
    .map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok((StatusCode::CREATED, Json(AssignmentView::new(assignment, &catalog))))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRowParams {
  pub source: RosterSource,
}

/// `DELETE /days/:date/rows/:id?source=` — template-sourced rows are refused
/// with guidance to edit the weekly template instead.
pub async fn delete_row<S>(
  State(store): State<Arc<S>>,
  Path((_date, id)): Path<(NaiveDate, Uuid)>,
  Query(params): Query<DeleteRowParams>,
) -> Result<StatusCode, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let row = match params.source {
    RosterSource::Template => RowRef::Template(id),
    RosterSource::Assignment => RowRef::Assignment(id),
  };
  store.delete_day_row(row).await.map_err(store_err)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /days/:date/finalize`
pub async fn finalize<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DayView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let roster = store.finalize_day(date).await.map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok(Json(DayView::new(roster, &catalog)))
}

/// `POST /days/:date/unfinalize`
pub async fn unfinalize<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DayView>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let roster = store.unfinalize_day(date).await.map_err(store_err)?;
  let catalog = store.reference_catalog().await.map_err(store_err)?;
  Ok(Json(DayView::new(roster, &catalog)))
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
  pub deleted: u64,
}

/// `POST /days/:date/reset` — delete all of the date's assignment rows,
/// reverting it to the weekly template. Refused while finalized.
pub async fn reset<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<ResetResponse>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let deleted = store.reset_day(date).await.map_err(store_err)?;
  Ok(Json(ResetResponse { deleted }))
}
