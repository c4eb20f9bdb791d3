//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use dockboard_core::{
  Error as CoreError,
  calendar::{DispatchTime, Workday},
  door::{MoveStatus, NewDoorAssignment},
  entity::{NewDriver, NewLoader, NewRoute, NewTrailer, NewTruck},
  roster::{
    AssignmentKind, LoadingStatus, NewTemplate, PlanningStatus, RosterFields,
    RosterPatch, RowRef,
  },
  store::ScheduleStore,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn monday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 1, 15).unwrap() }

fn saturday() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 1, 13).unwrap() }

struct Refs {
  driver:  Uuid,
  truck:   Uuid,
  trailer: Uuid,
  route:   Uuid,
  loader:  Uuid,
}

async fn seed_refs(s: &SqliteStore) -> Refs {
  let driver = s
    .add_driver(NewDriver { name: "J. Smith".into(), status: Default::default() })
    .await
    .unwrap();
  let truck = s
    .add_truck(NewTruck {
      number: "88".into(),
      kind:   Default::default(),
      status: Default::default(),
      notes:  None,
    })
    .await
    .unwrap();
  let trailer = s
    .add_trailer(NewTrailer {
      number: "1027".into(),
      kind:   Default::default(),
      status: Default::default(),
      notes:  None,
    })
    .await
    .unwrap();
  let route = s
    .add_route(NewRoute {
      code:        "R12".into(),
      description: None,
      status:      Default::default(),
    })
    .await
    .unwrap();
  let loader = s
    .add_loader(NewLoader { name: "Pat Doe".into(), status: Default::default() })
    .await
    .unwrap();
  Refs {
    driver:  driver.driver_id,
    truck:   truck.truck_id,
    trailer: trailer.trailer_id,
    route:   route.route_id,
    loader:  loader.loader_id,
  }
}

async fn monday_template(s: &SqliteStore, refs: &Refs, backhaul: Option<&str>) -> Uuid {
  let row = s
    .add_template(NewTemplate {
      day_of_week: Workday::Monday,
      fields:      RosterFields {
        route_id:      Some(refs.route),
        driver_id:     Some(refs.driver),
        truck_id:      Some(refs.truck),
        trailer_id:    Some(refs.trailer),
        dispatch_time: Some(DispatchTime::parse("05:30:00").unwrap()),
        backhaul:      backhaul.map(str::to_owned),
        notes:         None,
      },
    })
    .await
    .unwrap();
  row.template_id
}

fn backhaul_patch(value: &str) -> RosterPatch {
  RosterPatch {
    backhaul: Some(Some(value.to_owned())),
    ..Default::default()
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn virtual_day_resolves_to_templates_in_order() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let first = monday_template(&s, &refs, None).await;
  let second = monday_template(&s, &refs, Some("second")).await;

  let roster = s.resolve_day(monday()).await.unwrap();
  assert!(!roster.materialized);
  assert!(!roster.finalized);
  assert_eq!(roster.rows.len(), 2);
  assert_eq!(roster.rows[0].id, first);
  assert_eq!(roster.rows[1].id, second);
  assert!(roster.rows.iter().all(|r| r.planning_status == PlanningStatus::Draft));
  assert!(roster.rows.iter().all(|r| r.loading_status == LoadingStatus::NotStarted));
}

#[tokio::test]
async fn weekend_resolves_to_empty_virtual_day() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;

  let roster = s.resolve_day(saturday()).await.unwrap();
  assert!(!roster.materialized);
  assert!(roster.rows.is_empty());
}

// ─── Promotion ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn promotion_preserves_the_roster() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, Some("mill run")).await;
  monday_template(&s, &refs, None).await;

  let before = s.resolve_day(monday()).await.unwrap();
  let created = s.promote_day(monday(), PlanningStatus::Draft).await.unwrap();
  let after = s.resolve_day(monday()).await.unwrap();

  assert!(after.materialized);
  assert_eq!(created.len(), before.rows.len());
  let before_fields: Vec<_> = before.rows.iter().map(|r| r.fields.clone()).collect();
  let after_fields: Vec<_> = after.rows.iter().map(|r| r.fields.clone()).collect();
  assert_eq!(before_fields, after_fields);

  // Templates survive untouched.
  let templates = s.list_templates(Workday::Monday).await.unwrap();
  assert_eq!(templates.len(), 2);
  assert_eq!(templates[0].fields.backhaul.as_deref(), Some("mill run"));
}

#[tokio::test]
async fn double_promotion_is_refused() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;

  s.promote_day(monday(), PlanningStatus::Draft).await.unwrap();
  let err = s.promote_day(monday(), PlanningStatus::Draft).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadyMaterialized(_))));
}

// ─── Field edits ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn template_edit_promotes_and_lands_on_the_right_row() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  // Two rows with identical payloads: only the template id can tell the
  // target apart.
  let _first = monday_template(&s, &refs, None).await;
  let second = monday_template(&s, &refs, None).await;

  let edited = s
    .edit_day_row(monday(), RowRef::Template(second), backhaul_patch("Acme Corp"))
    .await
    .unwrap();
  assert_eq!(edited.fields.backhaul.as_deref(), Some("Acme Corp"));
  assert!(edited.modified_from_template);
  assert_eq!(edited.sort_order, 1);

  let roster = s.resolve_day(monday()).await.unwrap();
  assert!(roster.materialized);
  assert_eq!(roster.rows.len(), 2);
  assert_eq!(roster.rows[0].fields.backhaul, None);
  assert_eq!(roster.rows[1].fields.backhaul.as_deref(), Some("Acme Corp"));
  assert_eq!(roster.rows[1].id, edited.assignment_id);

  // The template row itself is unmodified.
  let templates = s.list_templates(Workday::Monday).await.unwrap();
  assert!(templates.iter().all(|t| t.fields.backhaul.is_none()));
}

#[tokio::test]
async fn assignment_edit_updates_in_place_and_clears_fields() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, Some("old")).await;

  let created = s.promote_day(monday(), PlanningStatus::Draft).await.unwrap();
  let id = created[0].assignment_id;

  let patch = RosterPatch {
    backhaul:      Some(None),
    dispatch_time: Some(Some(DispatchTime::parse("6:15am").unwrap())),
    ..Default::default()
  };
  let edited = s
    .edit_day_row(monday(), RowRef::Assignment(id), patch)
    .await
    .unwrap();

  assert_eq!(edited.fields.backhaul, None);
  assert_eq!(
    edited.fields.dispatch_time.unwrap().storage(),
    "06:15:00"
  );
  // Untouched fields survive.
  assert_eq!(edited.fields.route_id, Some(refs.route));
}

#[tokio::test]
async fn editing_a_missing_row_fails() {
  let s = store().await;
  seed_refs(&s).await;

  let err = s
    .edit_day_row(monday(), RowRef::Assignment(Uuid::new_v4()), backhaul_patch("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AssignmentNotFound(_))));

  let err = s
    .edit_day_row(monday(), RowRef::Template(Uuid::new_v4()), backhaul_patch("x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TemplateNotFound(_))));
}

// ─── Add / delete rows ───────────────────────────────────────────────────────

#[tokio::test]
async fn append_promotes_first_then_adds_an_empty_row() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;

  let appended = s
    .append_assignment(monday(), AssignmentKind::Help)
    .await
    .unwrap();
  assert_eq!(appended.planning_status, PlanningStatus::Draft);
  assert_eq!(appended.kind, AssignmentKind::Help);
  assert_eq!(appended.fields, RosterFields::default());
  assert_eq!(appended.sort_order, 1);

  let roster = s.resolve_day(monday()).await.unwrap();
  assert!(roster.materialized);
  assert_eq!(roster.rows.len(), 2);

  // Cancelling the new row deletes just it; the day stays materialized.
  s.delete_day_row(RowRef::Assignment(appended.assignment_id))
    .await
    .unwrap();
  let roster = s.resolve_day(monday()).await.unwrap();
  assert!(roster.materialized);
  assert_eq!(roster.rows.len(), 1);
}

#[tokio::test]
async fn deleting_a_template_sourced_row_is_refused() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let template_id = monday_template(&s, &refs, None).await;

  let err = s
    .delete_day_row(RowRef::Template(template_id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TemplateSourcedRow(_))));

  // Still there.
  assert_eq!(s.list_templates(Workday::Monday).await.unwrap().len(), 1);
}

// ─── Finalize / unfinalize ───────────────────────────────────────────────────

#[tokio::test]
async fn finalize_on_a_virtual_day_promotes_as_finalized() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;

  let roster = s.finalize_day(monday()).await.unwrap();
  assert!(roster.materialized);
  assert!(roster.finalized);
  assert!(
    roster
      .rows
      .iter()
      .all(|r| r.planning_status == PlanningStatus::Finalized)
  );

  let finalized = s.list_finalized(monday()).await.unwrap();
  assert_eq!(finalized.len(), 1);
}

#[tokio::test]
async fn finalize_with_empty_roster_fails_and_writes_nothing() {
  let s = store().await;
  seed_refs(&s).await;

  for date in [monday(), saturday()] {
    let err = s.finalize_day(date).await.unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::EmptyRoster(_))));
    let roster = s.resolve_day(date).await.unwrap();
    assert!(!roster.materialized);
    assert!(roster.rows.is_empty());
  }
}

#[tokio::test]
async fn finalize_is_idempotent() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, Some("mill run")).await;

  let first = s.finalize_day(monday()).await.unwrap();
  let second = s.finalize_day(monday()).await.unwrap();

  assert!(second.finalized);
  let first_rows: Vec<_> = first.rows.iter().map(|r| (r.id, r.fields.clone())).collect();
  let second_rows: Vec<_> = second.rows.iter().map(|r| (r.id, r.fields.clone())).collect();
  assert_eq!(first_rows, second_rows);
}

#[tokio::test]
async fn unfinalize_then_finalize_round_trips() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, Some("mill run")).await;

  let finalized = s.finalize_day(monday()).await.unwrap();
  let drafted = s.unfinalize_day(monday()).await.unwrap();
  assert!(!drafted.finalized);
  assert!(
    drafted
      .rows
      .iter()
      .all(|r| r.planning_status == PlanningStatus::Draft)
  );

  let refinalized = s.finalize_day(monday()).await.unwrap();
  assert!(refinalized.finalized);
  // Only status moved; content and identity are unchanged throughout.
  let ids: Vec<_> = finalized.rows.iter().map(|r| r.id).collect();
  let ids_after: Vec<_> = refinalized.rows.iter().map(|r| r.id).collect();
  assert_eq!(ids, ids_after);
  assert_eq!(
    refinalized.rows[0].fields.backhaul.as_deref(),
    Some("mill run")
  );
}

// ─── Reset ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_reverts_to_the_template_exactly() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let template_id = monday_template(&s, &refs, None).await;

  s.edit_day_row(monday(), RowRef::Template(template_id), backhaul_patch("Acme"))
    .await
    .unwrap();
  assert!(s.resolve_day(monday()).await.unwrap().materialized);

  let deleted = s.reset_day(monday()).await.unwrap();
  assert_eq!(deleted, 1);

  let roster = s.resolve_day(monday()).await.unwrap();
  assert!(!roster.materialized);
  assert_eq!(roster.rows.len(), 1);
  assert_eq!(roster.rows[0].id, template_id);
  assert_eq!(roster.rows[0].fields.backhaul, None);
}

#[tokio::test]
async fn reset_is_refused_while_finalized() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;
  s.finalize_day(monday()).await.unwrap();

  let err = s.reset_day(monday()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DayFinalized(_))));
  assert!(s.resolve_day(monday()).await.unwrap().materialized);

  s.unfinalize_day(monday()).await.unwrap();
  assert_eq!(s.reset_day(monday()).await.unwrap(), 1);
}

// ─── Loader crews ────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_crew_member_starts_loading_exactly_once() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;
  let roster = s.finalize_day(monday()).await.unwrap();
  let assignment_id = roster.rows[0].id;

  let second_loader = s
    .add_loader(NewLoader { name: "Sam Lee".into(), status: Default::default() })
    .await
    .unwrap();

  // First member flips not_started -> in_progress.
  let crew = s.add_crew_member(assignment_id, refs.loader).await.unwrap();
  let roster = s.resolve_day(monday()).await.unwrap();
  assert_eq!(roster.rows[0].loading_status, LoadingStatus::InProgress);

  // Second member leaves it alone.
  s.add_crew_member(assignment_id, second_loader.loader_id)
    .await
    .unwrap();
  let roster = s.resolve_day(monday()).await.unwrap();
  assert_eq!(roster.rows[0].loading_status, LoadingStatus::InProgress);

  assert_eq!(s.list_crew(monday()).await.unwrap().len(), 2);

  // Removing every member never reverts the status.
  s.remove_crew_member(crew.crew_id).await.unwrap();
  let roster = s.resolve_day(monday()).await.unwrap();
  assert_eq!(roster.rows[0].loading_status, LoadingStatus::InProgress);
}

#[tokio::test]
async fn crew_membership_is_unique_per_loader() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;
  let roster = s.finalize_day(monday()).await.unwrap();
  let assignment_id = roster.rows[0].id;

  s.add_crew_member(assignment_id, refs.loader).await.unwrap();
  let err = s
    .add_crew_member(assignment_id, refs.loader)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateCrewMember { .. })));
}

#[tokio::test]
async fn crew_rejects_unknown_assignment_and_loader() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  monday_template(&s, &refs, None).await;
  let roster = s.finalize_day(monday()).await.unwrap();
  let assignment_id = roster.rows[0].id;

  let err = s
    .add_crew_member(Uuid::new_v4(), refs.loader)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AssignmentNotFound(_))));

  let err = s
    .add_crew_member(assignment_id, Uuid::new_v4())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::LoaderNotFound(_))));
}

// ─── Dock doors ──────────────────────────────────────────────────────────────

async fn finalized_assignment(s: &SqliteStore, refs: &Refs) -> Uuid {
  monday_template(s, refs, None).await;
  let roster = s.finalize_day(monday()).await.unwrap();
  roster.rows[0].id
}

#[tokio::test]
async fn door_occupancy_is_unique_per_door_and_date() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let assignment_id = finalized_assignment(&s, &refs).await;

  s.assign_door(NewDoorAssignment {
    date:                monday(),
    door_number:         7,
    trailer_id:          refs.trailer,
    daily_assignment_id: Some(assignment_id),
  })
  .await
  .unwrap();

  let spare = s
    .add_trailer(NewTrailer {
      number: "1050".into(),
      kind:   Default::default(),
      status: Default::default(),
      notes:  None,
    })
    .await
    .unwrap();

  let err = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         7,
      trailer_id:          spare.trailer_id,
      daily_assignment_id: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DoorOccupied { door: 7, .. })));
}

#[tokio::test]
async fn an_assignment_occupies_at_most_one_door() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let assignment_id = finalized_assignment(&s, &refs).await;

  s.assign_door(NewDoorAssignment {
    date:                monday(),
    door_number:         7,
    trailer_id:          refs.trailer,
    daily_assignment_id: Some(assignment_id),
  })
  .await
  .unwrap();

  let err = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         8,
      trailer_id:          refs.trailer,
      daily_assignment_id: Some(assignment_id),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TrailerAlreadyDocked(_))));
}

#[tokio::test]
async fn departure_retires_the_door_and_frees_it() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let assignment_id = finalized_assignment(&s, &refs).await;

  let door = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         9,
      trailer_id:          refs.trailer,
      daily_assignment_id: Some(assignment_id),
    })
    .await
    .unwrap();

  // Free-form transitions first.
  let moved = s.set_move_status(door.door_id, MoveStatus::TruckIn).await.unwrap();
  assert_eq!(moved.move_status, MoveStatus::TruckIn);
  assert!(moved.is_active());

  let departed = s
    .set_move_status(door.door_id, MoveStatus::Departed)
    .await
    .unwrap();
  assert!(departed.removed_at.is_some());

  let snapshot = s.dock_snapshot(monday()).await.unwrap();
  assert!(snapshot.occupant(9).is_none());
  // The route's trailer is back in the unassigned pool.
  assert_eq!(snapshot.unassigned.len(), 1);

  // The door can be taken again.
  s.assign_door(NewDoorAssignment {
    date:                monday(),
    door_number:         9,
    trailer_id:          refs.trailer,
    daily_assignment_id: Some(assignment_id),
  })
  .await
  .unwrap();
}

#[tokio::test]
async fn clear_door_retires_without_departing() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let assignment_id = finalized_assignment(&s, &refs).await;

  let door = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         10,
      trailer_id:          refs.trailer,
      daily_assignment_id: Some(assignment_id),
    })
    .await
    .unwrap();

  let cleared = s.clear_door(door.door_id).await.unwrap();
  assert!(cleared.removed_at.is_some());
  assert_eq!(cleared.move_status, MoveStatus::AtDoor);

  // Clearing twice finds no active row.
  let err = s.clear_door(door.door_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DoorNotFound(_))));
}

#[tokio::test]
async fn dock_pool_holds_only_finalized_trailers_without_doors() {
  let s = store().await;
  let refs = seed_refs(&s).await;

  // Draft day: nothing in the pool.
  monday_template(&s, &refs, None).await;
  s.promote_day(monday(), PlanningStatus::Draft).await.unwrap();
  let snapshot = s.dock_snapshot(monday()).await.unwrap();
  assert!(snapshot.unassigned.is_empty());

  // Finalized: the trailer shows up.
  let roster = s.finalize_day(monday()).await.unwrap();
  let assignment_id = roster.rows[0].id;
  let snapshot = s.dock_snapshot(monday()).await.unwrap();
  assert_eq!(snapshot.unassigned.len(), 1);
  assert_eq!(snapshot.unassigned[0].trailer_id, refs.trailer);

  // At a door: out of the pool.
  s.assign_door(NewDoorAssignment {
    date:                monday(),
    door_number:         4,
    trailer_id:          refs.trailer,
    daily_assignment_id: Some(assignment_id),
  })
  .await
  .unwrap();
  let snapshot = s.dock_snapshot(monday()).await.unwrap();
  assert!(snapshot.unassigned.is_empty());
  assert_eq!(snapshot.occupied_count(), 1);
}

#[tokio::test]
async fn door_numbers_outside_the_dock_are_rejected() {
  let s = store().await;
  let refs = seed_refs(&s).await;

  let err = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         3,
      trailer_id:          refs.trailer,
      daily_assignment_id: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidDoor(3))));
}

#[tokio::test]
async fn storage_trailer_is_found_by_number() {
  let s = store().await;
  seed_refs(&s).await;
  s.add_trailer(NewTrailer {
    number: "1007".into(),
    kind:   Default::default(),
    status: Default::default(),
    notes:  None,
  })
  .await
  .unwrap();

  let found = s.find_trailer("1007").await.unwrap();
  assert!(found.is_some());
  assert!(s.find_trailer("9999").await.unwrap().is_none());

  // Pinned with no route semantics.
  let door = s
    .assign_door(NewDoorAssignment {
      date:                monday(),
      door_number:         4,
      trailer_id:          found.unwrap().trailer_id,
      daily_assignment_id: None,
    })
    .await
    .unwrap();
  assert_eq!(door.daily_assignment_id, None);
}

// ─── Loading status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn loading_status_moves_freely() {
  let s = store().await;
  let refs = seed_refs(&s).await;
  let assignment_id = finalized_assignment(&s, &refs).await;

  for status in [
    LoadingStatus::InProgress,
    LoadingStatus::Loaded,
    LoadingStatus::NotStarted,
  ] {
    let updated = s.set_loading_status(assignment_id, status).await.unwrap();
    assert_eq!(updated.loading_status, status);
  }

  let err = s
    .set_loading_status(Uuid::new_v4(), LoadingStatus::Loaded)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AssignmentNotFound(_))));
}

// ─── Templates ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn template_crud_keeps_sort_order() {
  let s = store().await;
  let refs = seed_refs(&s).await;

  let first = monday_template(&s, &refs, None).await;
  let second = monday_template(&s, &refs, None).await;

  let rows = s.list_templates(Workday::Monday).await.unwrap();
  assert_eq!(rows[0].sort_order, 0);
  assert_eq!(rows[1].sort_order, 1);

  let updated = s
    .update_template(first, backhaul_patch("northbound"))
    .await
    .unwrap();
  assert_eq!(updated.fields.backhaul.as_deref(), Some("northbound"));

  s.delete_template(first).await.unwrap();
  let rows = s.list_templates(Workday::Monday).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].template_id, second);

  let err = s.delete_template(first).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TemplateNotFound(_))));
}
