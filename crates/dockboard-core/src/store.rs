//! The `ScheduleStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `dockboard-store-sqlite`). Higher layers (`dockboard-api`,
//! `dockboard-server`) depend on this abstraction, not on any concrete
//! backend.
//!
//! Every operation that touches more than one row of a date (promotion,
//! finalize, unfinalize, reset, edit-with-promotion) must be atomic in the
//! backend: the date is the unit of consistency, and the uniform
//! planning-status-per-date invariant is a guarantee here, not a caller
//! convention.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  calendar::Workday,
  door::{DockSnapshot, DoorAssignment, MoveStatus, NewDoorAssignment},
  entity::{
    Driver, EntityStatus, Loader, NewDriver, NewLoader, NewRoute, NewTrailer,
    NewTruck, ReferenceCatalog, Route, Trailer, Truck,
  },
  roster::{
    AssignmentKind, CrewAssignment, DailyAssignment, DayRoster, LoadingStatus,
    NewTemplate, PlanningStatus, RosterPatch, RowRef, TemplateRow,
  },
};

/// Abstraction over a dockboard schedule store backend.
pub trait ScheduleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference entities ────────────────────────────────────────────────

  fn add_driver(
    &self,
    input: NewDriver,
  ) -> impl Future<Output = Result<Driver, Self::Error>> + Send + '_;

  fn list_drivers(
    &self,
    status: Option<EntityStatus>,
  ) -> impl Future<Output = Result<Vec<Driver>, Self::Error>> + Send + '_;

  fn add_truck(
    &self,
    input: NewTruck,
  ) -> impl Future<Output = Result<Truck, Self::Error>> + Send + '_;

  fn list_trucks(
    &self,
    status: Option<EntityStatus>,
  ) -> impl Future<Output = Result<Vec<Truck>, Self::Error>> + Send + '_;

  fn add_trailer(
    &self,
    input: NewTrailer,
  ) -> impl Future<Output = Result<Trailer, Self::Error>> + Send + '_;

  fn list_trailers(
    &self,
    status: Option<EntityStatus>,
  ) -> impl Future<Output = Result<Vec<Trailer>, Self::Error>> + Send + '_;

  /// Look a trailer up by its equipment number (storage-trailer pinning).
  fn find_trailer<'a>(
    &'a self,
    number: &'a str,
  ) -> impl Future<Output = Result<Option<Trailer>, Self::Error>> + Send + 'a;

  fn add_loader(
    &self,
    input: NewLoader,
  ) -> impl Future<Output = Result<Loader, Self::Error>> + Send + '_;

  fn list_loaders(
    &self,
    status: Option<EntityStatus>,
  ) -> impl Future<Output = Result<Vec<Loader>, Self::Error>> + Send + '_;

  fn add_route(
    &self,
    input: NewRoute,
  ) -> impl Future<Output = Result<Route, Self::Error>> + Send + '_;

  fn list_routes(
    &self,
    status: Option<EntityStatus>,
  ) -> impl Future<Output = Result<Vec<Route>, Self::Error>> + Send + '_;

  /// Snapshot every reference table for read-model assembly.
  fn reference_catalog(
    &self,
  ) -> impl Future<Output = Result<ReferenceCatalog, Self::Error>> + Send + '_;

  // ── Weekly templates ──────────────────────────────────────────────────

  /// Append a template row at the end of the day's sort order.
  fn add_template(
    &self,
    input: NewTemplate,
  ) -> impl Future<Output = Result<TemplateRow, Self::Error>> + Send + '_;

  fn list_templates(
    &self,
    day: Workday,
  ) -> impl Future<Output = Result<Vec<TemplateRow>, Self::Error>> + Send + '_;

  fn update_template(
    &self,
    template_id: Uuid,
    patch: RosterPatch,
  ) -> impl Future<Output = Result<TemplateRow, Self::Error>> + Send + '_;

  fn delete_template(
    &self,
    template_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Daily assignment lifecycle ────────────────────────────────────────

  /// Resolve what a date's roster looks like: assignment rows if any exist,
  /// the weekday's template rows otherwise.
  fn resolve_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<DayRoster, Self::Error>> + Send + '_;

  /// Materialize a virtual date: copy every template row of the weekday into
  /// assignment rows with the given planning status, atomically. Fails with
  /// `AlreadyMaterialized` if assignment rows already exist. The created
  /// rows are returned in template order, ids included.
  fn promote_day(
    &self,
    date: NaiveDate,
    status: PlanningStatus,
  ) -> impl Future<Output = Result<Vec<DailyAssignment>, Self::Error>> + Send + '_;

  /// Apply a field patch to one roster row of a date. A `Template` reference
  /// promotes the whole day (draft) and applies the patch to the assignment
  /// created from exactly that template row, in one transaction; the new
  /// row's id comes back in the returned assignment.
  fn edit_day_row(
    &self,
    date: NaiveDate,
    row: RowRef,
    patch: RosterPatch,
  ) -> impl Future<Output = Result<DailyAssignment, Self::Error>> + Send + '_;

  /// Add one empty draft row of the given kind at the end of the date's
  /// roster, promoting the day first if it is still virtual.
  fn append_assignment(
    &self,
    date: NaiveDate,
    kind: AssignmentKind,
  ) -> impl Future<Output = Result<DailyAssignment, Self::Error>> + Send + '_;

  /// Delete one materialized row. Template references are refused with
  /// `TemplateSourcedRow` — the weekly template is edited elsewhere.
  fn delete_day_row(
    &self,
    row: RowRef,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Lock the date's roster as authoritative for downstream consumption.
  /// Promotes directly as finalized when the date is virtual; bulk-updates
  /// otherwise. Fails with `EmptyRoster` when the resolved roster is empty.
  /// Idempotent on an already-finalized date.
  fn finalize_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<DayRoster, Self::Error>> + Send + '_;

  /// Bulk-update all rows of the date back to draft. Roster content is
  /// untouched.
  fn unfinalize_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<DayRoster, Self::Error>> + Send + '_;

  /// Delete every assignment row for the date, reverting it to virtual.
  /// Refused with `DayFinalized` while the date is finalized.
  fn reset_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn set_loading_status(
    &self,
    assignment_id: Uuid,
    status: LoadingStatus,
  ) -> impl Future<Output = Result<DailyAssignment, Self::Error>> + Send + '_;

  /// Finalized assignments for a delivery date, in sort order.
  fn list_finalized(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DailyAssignment>, Self::Error>> + Send + '_;

  // ── Loader crews ──────────────────────────────────────────────────────

  /// Put a loader on an assignment's crew. The first crew member of an
  /// assignment whose loading status is still `not_started` flips it to
  /// `in_progress`, in the same transaction; later additions do not.
  fn add_crew_member(
    &self,
    assignment_id: Uuid,
    loader_id: Uuid,
  ) -> impl Future<Output = Result<CrewAssignment, Self::Error>> + Send + '_;

  /// Remove a crew member. Loading status never reverts.
  fn remove_crew_member(
    &self,
    crew_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every crew row attached to the date's assignments.
  fn list_crew(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<CrewAssignment>, Self::Error>> + Send + '_;

  // ── Dock doors ────────────────────────────────────────────────────────

  /// Derive the full dock picture for a date from scratch: active door
  /// assignments plus the unassigned in-yard pool (finalized assignments
  /// with a trailer and no active door).
  fn dock_snapshot(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<DockSnapshot, Self::Error>> + Send + '_;

  /// Put a trailer at a door with `move_status = at_door`. Fails with
  /// `DoorOccupied` or `TrailerAlreadyDocked` when an active row already
  /// covers the door or the assignment.
  fn assign_door(
    &self,
    input: NewDoorAssignment,
  ) -> impl Future<Output = Result<DoorAssignment, Self::Error>> + Send + '_;

  /// Update the yard-movement state. `Departed` additionally stamps
  /// `removed_at`, retiring the row and freeing the door.
  fn set_move_status(
    &self,
    door_id: Uuid,
    status: MoveStatus,
  ) -> impl Future<Output = Result<DoorAssignment, Self::Error>> + Send + '_;

  /// Retire a door assignment without requiring the `departed` state.
  fn clear_door(
    &self,
    door_id: Uuid,
  ) -> impl Future<Output = Result<DoorAssignment, Self::Error>> + Send + '_;
}
