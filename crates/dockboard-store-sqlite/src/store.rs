//! [`SqliteStore`] — the SQLite implementation of
//! [`ScheduleStore`](dockboard_core::store::ScheduleStore).

use std::path::Path;

use chrono::{NaiveDate, Utc};
use dockboard_core::{
  Error as CoreError,
  calendar::Workday,
  door::{
    DOOR_NUMBERS, DockSnapshot, DoorAssignment, MoveStatus, NewDoorAssignment,
    YardTrailer,
  },
  entity::{
    Driver, EntityStatus, Loader, NewDriver, NewLoader, NewRoute, NewTrailer,
    NewTruck, ReferenceCatalog, Route, Trailer, Truck,
  },
  roster::{
    AssignmentKind, CrewAssignment, DailyAssignment, DayRoster, LoadingStatus,
    NewTemplate, PlanningStatus, RosterPatch, RowRef, TemplateRow,
  },
  store::ScheduleStore,
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawAssignment, RawCrew, RawDoor, RawEntity, RawTemplate, decode_loading_status,
    decode_opt_uuid, decode_time, decode_uuid, encode_assignment_kind,
    encode_date, encode_dt, encode_entity_status, encode_loading_status,
    encode_move_status, encode_planning_status, encode_trailer_kind,
    encode_truck_kind, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Column lists ────────────────────────────────────────────────────────────

const TEMPLATE_COLS: &str = "template_id, day_of_week, route_id, driver_id, \
   truck_id, trailer_id, dispatch_time, backhaul, notes, sort_order, created_at";

const ASSIGNMENT_COLS: &str = "assignment_id, date, kind, route_id, driver_id, \
   truck_id, trailer_id, dispatch_time, backhaul, notes, planning_status, \
   loading_status, modified_from_template, sort_order, created_at";

const DOOR_COLS: &str = "door_id, door_number, trailer_id, \
   daily_assignment_id, date, move_status, assigned_at, removed_at";

const CREW_COLS: &str = "crew_id, assignment_id, loader_id, created_at";

const DRIVER_SELECT: &str =
  "SELECT driver_id, name, NULL, NULL, NULL, status, created_at FROM drivers";
const TRUCK_SELECT: &str =
  "SELECT truck_id, number, kind, NULL, notes, status, created_at FROM trucks";
const TRAILER_SELECT: &str =
  "SELECT trailer_id, number, kind, NULL, notes, status, created_at FROM trailers";
const LOADER_SELECT: &str =
  "SELECT loader_id, name, NULL, NULL, NULL, status, created_at FROM loaders";
const ROUTE_SELECT: &str =
  "SELECT route_id, code, NULL, description, NULL, status, created_at FROM routes";

// ─── Query helpers ───────────────────────────────────────────────────────────
// All take `&rusqlite::Connection` so they run equally inside and outside a
// transaction (`Transaction` derefs to `Connection`).

fn assignments_for_date(
  conn: &rusqlite::Connection,
  date: &str,
) -> rusqlite::Result<Vec<RawAssignment>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ASSIGNMENT_COLS} FROM daily_assignments
     WHERE date = ?1 ORDER BY sort_order, created_at"
  ))?;
  let rows = stmt
    .query_map([date], RawAssignment::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn assignment_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawAssignment>> {
  conn
    .query_row(
      &format!("SELECT {ASSIGNMENT_COLS} FROM daily_assignments WHERE assignment_id = ?1"),
      [id],
      RawAssignment::from_row,
    )
    .optional()
}

fn assignment_count(conn: &rusqlite::Connection, date: &str) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM daily_assignments WHERE date = ?1",
    [date],
    |r| r.get(0),
  )
}

fn templates_for_day(
  conn: &rusqlite::Connection,
  day: i64,
) -> rusqlite::Result<Vec<RawTemplate>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {TEMPLATE_COLS} FROM weekly_templates
     WHERE day_of_week = ?1 ORDER BY sort_order, created_at"
  ))?;
  let rows = stmt
    .query_map([day], RawTemplate::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn template_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawTemplate>> {
  conn
    .query_row(
      &format!("SELECT {TEMPLATE_COLS} FROM weekly_templates WHERE template_id = ?1"),
      [id],
      RawTemplate::from_row,
    )
    .optional()
}

fn door_by_id(
  conn: &rusqlite::Connection,
  id: &str,
) -> rusqlite::Result<Option<RawDoor>> {
  conn
    .query_row(
      &format!("SELECT {DOOR_COLS} FROM door_assignments WHERE door_id = ?1"),
      [id],
      RawDoor::from_row,
    )
    .optional()
}

/// Copy every template row of the date's weekday into assignment rows with
/// the given planning status. Caller holds the transaction and has already
/// verified the date is virtual. Returns `(template_id, assignment_id)`
/// pairs in template order — this mapping is how an edit that triggered
/// promotion finds its target row.
fn promote_templates(
  conn:   &rusqlite::Connection,
  date:   &str,
  day:    Option<i64>,
  status: &str,
  now:    &str,
) -> rusqlite::Result<Vec<(String, String)>> {
  let Some(day) = day else { return Ok(Vec::new()) };
  let templates = templates_for_day(conn, day)?;
  let mut created = Vec::with_capacity(templates.len());

  for (index, t) in templates.iter().enumerate() {
    let assignment_id = encode_uuid(Uuid::new_v4());
    conn.execute(
      "INSERT INTO daily_assignments (
         assignment_id, date, route_id, driver_id, truck_id, trailer_id,
         dispatch_time, backhaul, notes, planning_status, sort_order, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
      rusqlite::params![
        assignment_id,
        date,
        t.fields.route_id,
        t.fields.driver_id,
        t.fields.truck_id,
        t.fields.trailer_id,
        t.fields.dispatch_time,
        t.fields.backhaul,
        t.fields.notes,
        status,
        index as i64,
        now,
      ],
    )?;
    created.push((t.template_id.clone(), assignment_id));
  }

  Ok(created)
}

/// The columns a [`RosterPatch`] touches, with their encoded values.
/// `None` means SQL NULL (the field is being cleared).
fn patch_columns(patch: &RosterPatch) -> Vec<(&'static str, Option<String>)> {
  let mut cols = Vec::new();
  if let Some(v) = patch.route_id {
    cols.push(("route_id", v.map(encode_uuid)));
  }
  if let Some(v) = patch.driver_id {
    cols.push(("driver_id", v.map(encode_uuid)));
  }
  if let Some(v) = patch.truck_id {
    cols.push(("truck_id", v.map(encode_uuid)));
  }
  if let Some(v) = patch.trailer_id {
    cols.push(("trailer_id", v.map(encode_uuid)));
  }
  if let Some(v) = patch.dispatch_time {
    cols.push(("dispatch_time", v.map(|t| t.storage())));
  }
  if let Some(v) = &patch.backhaul {
    cols.push(("backhaul", v.clone()));
  }
  if let Some(v) = &patch.notes {
    cols.push(("notes", v.clone()));
  }
  cols
}

fn apply_patch(
  conn:   &rusqlite::Connection,
  table:  &str,
  id_col: &str,
  id:     &str,
  cols:   &[(&'static str, Option<String>)],
) -> rusqlite::Result<()> {
  for (col, value) in cols {
    conn.execute(
      &format!("UPDATE {table} SET {col} = ?1 WHERE {id_col} = ?2"),
      rusqlite::params![value, id],
    )?;
  }
  Ok(())
}

fn day_number(date: NaiveDate) -> Option<i64> {
  Workday::of(date).map(|d| d.number() as i64)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A dockboard schedule store backed by a single SQLite file. Clones share
/// the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_raw_entities(
    &self,
    base:   &'static str,
    order:  &'static str,
    status: Option<EntityStatus>,
  ) -> Result<Vec<RawEntity>> {
    let status_str = status.map(encode_entity_status).map(str::to_owned);

    let raws = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let mut stmt =
            conn.prepare(&format!("{base} WHERE status = ?1 ORDER BY {order}"))?;
          stmt
            .query_map([s], RawEntity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!("{base} ORDER BY {order}"))?;
          stmt
            .query_map([], RawEntity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    Ok(raws)
  }
}

// ─── ScheduleStore impl ──────────────────────────────────────────────────────

impl ScheduleStore for SqliteStore {
  type Error = Error;

  // ── Reference entities ────────────────────────────────────────────────────

  async fn add_driver(&self, input: NewDriver) -> Result<Driver> {
    let driver = Driver {
      driver_id:  Uuid::new_v4(),
      name:       input.name,
      status:     input.status,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(driver.driver_id);
    let name       = driver.name.clone();
    let status_str = encode_entity_status(driver.status).to_owned();
    let at_str     = encode_dt(driver.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO drivers (driver_id, name, status, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(driver)
  }

  async fn list_drivers(&self, status: Option<EntityStatus>) -> Result<Vec<Driver>> {
    self
      .list_raw_entities(DRIVER_SELECT, "name", status)
      .await?
      .into_iter()
      .map(RawEntity::into_driver)
      .collect()
  }

  async fn add_truck(&self, input: NewTruck) -> Result<Truck> {
    let truck = Truck {
      truck_id:   Uuid::new_v4(),
      number:     input.number,
      kind:       input.kind,
      status:     input.status,
      notes:      input.notes,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(truck.truck_id);
    let number     = truck.number.clone();
    let kind_str   = encode_truck_kind(truck.kind).to_owned();
    let status_str = encode_entity_status(truck.status).to_owned();
    let notes      = truck.notes.clone();
    let at_str     = encode_dt(truck.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trucks (truck_id, number, kind, status, notes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, number, kind_str, status_str, notes, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(truck)
  }

  async fn list_trucks(&self, status: Option<EntityStatus>) -> Result<Vec<Truck>> {
    self
      .list_raw_entities(TRUCK_SELECT, "number", status)
      .await?
      .into_iter()
      .map(RawEntity::into_truck)
      .collect()
  }

  async fn add_trailer(&self, input: NewTrailer) -> Result<Trailer> {
    let trailer = Trailer {
      trailer_id: Uuid::new_v4(),
      number:     input.number,
      kind:       input.kind,
      status:     input.status,
      notes:      input.notes,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(trailer.trailer_id);
    let number     = trailer.number.clone();
    let kind_str   = encode_trailer_kind(trailer.kind).to_owned();
    let status_str = encode_entity_status(trailer.status).to_owned();
    let notes      = trailer.notes.clone();
    let at_str     = encode_dt(trailer.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trailers (trailer_id, number, kind, status, notes, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, number, kind_str, status_str, notes, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(trailer)
  }

  async fn list_trailers(&self, status: Option<EntityStatus>) -> Result<Vec<Trailer>> {
    self
      .list_raw_entities(TRAILER_SELECT, "number", status)
      .await?
      .into_iter()
      .map(RawEntity::into_trailer)
      .collect()
  }

  async fn find_trailer(&self, number: &str) -> Result<Option<Trailer>> {
    let number = number.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{TRAILER_SELECT} WHERE number = ?1"),
              [number],
              RawEntity::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntity::into_trailer).transpose()
  }

  async fn add_loader(&self, input: NewLoader) -> Result<Loader> {
    let loader = Loader {
      loader_id:  Uuid::new_v4(),
      name:       input.name,
      status:     input.status,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(loader.loader_id);
    let name       = loader.name.clone();
    let status_str = encode_entity_status(loader.status).to_owned();
    let at_str     = encode_dt(loader.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO loaders (loader_id, name, status, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(loader)
  }

  async fn list_loaders(&self, status: Option<EntityStatus>) -> Result<Vec<Loader>> {
    self
      .list_raw_entities(LOADER_SELECT, "name", status)
      .await?
      .into_iter()
      .map(RawEntity::into_loader)
      .collect()
  }

  async fn add_route(&self, input: NewRoute) -> Result<Route> {
    let route = Route {
      route_id:    Uuid::new_v4(),
      code:        input.code,
      description: input.description,
      status:      input.status,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(route.route_id);
    let code        = route.code.clone();
    let description = route.description.clone();
    let status_str  = encode_entity_status(route.status).to_owned();
    let at_str      = encode_dt(route.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO routes (route_id, code, description, status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, code, description, status_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(route)
  }

  async fn list_routes(&self, status: Option<EntityStatus>) -> Result<Vec<Route>> {
    self
      .list_raw_entities(ROUTE_SELECT, "code", status)
      .await?
      .into_iter()
      .map(RawEntity::into_route)
      .collect()
  }

  async fn reference_catalog(&self) -> Result<ReferenceCatalog> {
    type Raws = (
      Vec<RawEntity>,
      Vec<RawEntity>,
      Vec<RawEntity>,
      Vec<RawEntity>,
      Vec<RawEntity>,
    );

    let (drivers, trucks, trailers, loaders, routes): Raws = self
      .conn
      .call(|conn| {
        let collect = |sql: &str| -> rusqlite::Result<Vec<RawEntity>> {
          let mut stmt = conn.prepare(sql)?;
          let rows = stmt
            .query_map([], RawEntity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        };
        Ok((
          collect(DRIVER_SELECT)?,
          collect(TRUCK_SELECT)?,
          collect(TRAILER_SELECT)?,
          collect(LOADER_SELECT)?,
          collect(ROUTE_SELECT)?,
        ))
      })
      .await?;

    let mut catalog = ReferenceCatalog::default();
    for raw in drivers {
      let d = raw.into_driver()?;
      catalog.drivers.insert(d.driver_id, d);
    }
    for raw in trucks {
      let t = raw.into_truck()?;
      catalog.trucks.insert(t.truck_id, t);
    }
    for raw in trailers {
      let t = raw.into_trailer()?;
      catalog.trailers.insert(t.trailer_id, t);
    }
    for raw in loaders {
      let l = raw.into_loader()?;
      catalog.loaders.insert(l.loader_id, l);
    }
    for raw in routes {
      let r = raw.into_route()?;
      catalog.routes.insert(r.route_id, r);
    }
    Ok(catalog)
  }

  // ── Weekly templates ──────────────────────────────────────────────────────

  async fn add_template(&self, input: NewTemplate) -> Result<TemplateRow> {
    let template_id = Uuid::new_v4();
    let created_at  = Utc::now();

    let id_str   = encode_uuid(template_id);
    let day      = input.day_of_week.number() as i64;
    let fields   = input.fields.clone();
    let time_str = fields.dispatch_time.map(|t| t.storage());
    let at_str   = encode_dt(created_at);

    let route    = fields.route_id.map(encode_uuid);
    let driver   = fields.driver_id.map(encode_uuid);
    let truck    = fields.truck_id.map(encode_uuid);
    let trailer  = fields.trailer_id.map(encode_uuid);
    let backhaul = fields.backhaul.clone();
    let notes    = fields.notes.clone();

    let sort_order = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM weekly_templates
           WHERE day_of_week = ?1",
          [day],
          |r| r.get(0),
        )?;
        tx.execute(
          "INSERT INTO weekly_templates (
             template_id, day_of_week, route_id, driver_id, truck_id,
             trailer_id, dispatch_time, backhaul, notes, sort_order, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str, day, route, driver, truck, trailer, time_str, backhaul,
            notes, next, at_str,
          ],
        )?;
        tx.commit()?;
        Ok(next)
      })
      .await?;

    Ok(TemplateRow {
      template_id,
      day_of_week: input.day_of_week,
      fields: input.fields,
      sort_order,
      created_at,
    })
  }

  async fn list_templates(&self, day: Workday) -> Result<Vec<TemplateRow>> {
    let day_num = day.number() as i64;

    let raws = self
      .conn
      .call(move |conn| Ok(templates_for_day(conn, day_num)?))
      .await?;

    raws.into_iter().map(RawTemplate::into_template).collect()
  }

  async fn update_template(
    &self,
    template_id: Uuid,
    patch: RosterPatch,
  ) -> Result<TemplateRow> {
    let id_str = encode_uuid(template_id);
    let cols   = patch_columns(&patch);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if template_by_id(&tx, &id_str)?.is_none() {
          return Ok(Err(Error::Core(CoreError::TemplateNotFound(template_id))));
        }
        apply_patch(&tx, "weekly_templates", "template_id", &id_str, &cols)?;
        let raw = template_by_id(&tx, &id_str)?;
        tx.commit()?;
        match raw {
          Some(raw) => Ok(Ok(raw)),
          None => Ok(Err(Error::Core(CoreError::TemplateNotFound(template_id)))),
        }
      })
      .await??;

    raw.into_template()
  }

  async fn delete_template(&self, template_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(template_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM weekly_templates WHERE template_id = ?1",
          [id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(CoreError::TemplateNotFound(template_id)));
    }
    Ok(())
  }

  // ── Daily assignment lifecycle ────────────────────────────────────────────

  async fn resolve_day(&self, date: NaiveDate) -> Result<DayRoster> {
    let date_str = encode_date(date);
    let day      = day_number(date);

    let (assignments, templates) = self
      .conn
      .call(move |conn| {
        let assignments = assignments_for_date(conn, &date_str)?;
        if !assignments.is_empty() {
          return Ok((assignments, Vec::new()));
        }
        let templates = match day {
          Some(d) => templates_for_day(conn, d)?,
          None => Vec::new(),
        };
        Ok((assignments, templates))
      })
      .await?;

    if assignments.is_empty() {
      let templates = templates
        .into_iter()
        .map(RawTemplate::into_template)
        .collect::<Result<Vec<_>>>()?;
      Ok(DayRoster::virtual_day(date, &templates))
    } else {
      let assignments = assignments
        .into_iter()
        .map(RawAssignment::into_assignment)
        .collect::<Result<Vec<_>>>()?;
      Ok(DayRoster::materialized_day(date, &assignments))
    }
  }

  async fn promote_day(
    &self,
    date: NaiveDate,
    status: PlanningStatus,
  ) -> Result<Vec<DailyAssignment>> {
    let date_str   = encode_date(date);
    let day        = day_number(date);
    let status_str = encode_planning_status(status).to_owned();
    let now_str    = encode_dt(Utc::now());

    let raws = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if assignment_count(&tx, &date_str)? > 0 {
          return Ok(Err(Error::Core(CoreError::AlreadyMaterialized(date))));
        }
        let created = promote_templates(&tx, &date_str, day, &status_str, &now_str)?;
        let mut raws = Vec::with_capacity(created.len());
        for (_, assignment_id) in &created {
          if let Some(raw) = assignment_by_id(&tx, assignment_id)? {
            raws.push(raw);
          }
        }
        tx.commit()?;
        Ok(Ok(raws))
      })
      .await??;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  async fn edit_day_row(
    &self,
    date: NaiveDate,
    row: RowRef,
    patch: RosterPatch,
  ) -> Result<DailyAssignment> {
    let date_str = encode_date(date);
    let day      = day_number(date);
    let now_str  = encode_dt(Utc::now());
    let cols     = patch_columns(&patch);

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let target_id = match row {
          RowRef::Assignment(id) => {
            let id_str = encode_uuid(id);
            if assignment_by_id(&tx, &id_str)?.is_none() {
              return Ok(Err(Error::Core(CoreError::AssignmentNotFound(id))));
            }
            id_str
          }
          RowRef::Template(template_id) => {
            if assignment_count(&tx, &date_str)? > 0 {
              return Ok(Err(Error::Core(CoreError::AlreadyMaterialized(date))));
            }
            let created = promote_templates(&tx, &date_str, day, "draft", &now_str)?;
            let wanted = encode_uuid(template_id);
            match created.into_iter().find(|(t, _)| *t == wanted) {
              Some((_, assignment_id)) => assignment_id,
              None => {
                return Ok(Err(Error::Core(CoreError::TemplateNotFound(template_id))));
              }
            }
          }
        };

        apply_patch(&tx, "daily_assignments", "assignment_id", &target_id, &cols)?;
        tx.execute(
          "UPDATE daily_assignments SET modified_from_template = 1
           WHERE assignment_id = ?1",
          [target_id.as_str()],
        )?;

        let raw = assignment_by_id(&tx, &target_id)?;
        tx.commit()?;
        match raw {
          Some(raw) => Ok(Ok(raw)),
          None => Ok(Err(Error::Decode("updated row vanished".into()))),
        }
      })
      .await??;

    raw.into_assignment()
  }

  async fn append_assignment(
    &self,
    date: NaiveDate,
    kind: AssignmentKind,
  ) -> Result<DailyAssignment> {
    let date_str = encode_date(date);
    let day      = day_number(date);
    let now_str  = encode_dt(Utc::now());
    let id_str   = encode_uuid(Uuid::new_v4());
    let kind_str = encode_assignment_kind(kind).to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if assignment_count(&tx, &date_str)? == 0 {
          promote_templates(&tx, &date_str, day, "draft", &now_str)?;
        }
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(sort_order) + 1, 0) FROM daily_assignments
           WHERE date = ?1",
          [date_str.as_str()],
          |r| r.get(0),
        )?;
        tx.execute(
          "INSERT INTO daily_assignments (assignment_id, date, kind, sort_order, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, date_str, kind_str, next, now_str],
        )?;
        let raw = assignment_by_id(&tx, &id_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_assignment(),
      None => Err(Error::Decode("inserted row vanished".into())),
    }
  }

  async fn delete_day_row(&self, row: RowRef) -> Result<()> {
    let id = match row {
      RowRef::Template(id) => {
        return Err(Error::Core(CoreError::TemplateSourcedRow(id)));
      }
      RowRef::Assignment(id) => id,
    };
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM daily_assignments WHERE assignment_id = ?1",
          [id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(CoreError::AssignmentNotFound(id)));
    }
    Ok(())
  }

  async fn finalize_day(&self, date: NaiveDate) -> Result<DayRoster> {
    let date_str = encode_date(date);
    let day      = day_number(date);
    let now_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if assignment_count(&tx, &date_str)? > 0 {
          tx.execute(
            "UPDATE daily_assignments SET planning_status = 'finalized'
             WHERE date = ?1",
            [date_str.as_str()],
          )?;
        } else {
          let created = promote_templates(&tx, &date_str, day, "finalized", &now_str)?;
          if created.is_empty() {
            // No writes happened; dropping the transaction rolls back.
            return Ok(Err(Error::Core(CoreError::EmptyRoster(date))));
          }
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    self.resolve_day(date).await
  }

  async fn unfinalize_day(&self, date: NaiveDate) -> Result<DayRoster> {
    let date_str = encode_date(date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE daily_assignments SET planning_status = 'draft' WHERE date = ?1",
          [date_str],
        )?;
        Ok(())
      })
      .await?;

    self.resolve_day(date).await
  }

  async fn reset_day(&self, date: NaiveDate) -> Result<u64> {
    let date_str = encode_date(date);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let finalized: i64 = tx.query_row(
          "SELECT COUNT(*) FROM daily_assignments
           WHERE date = ?1 AND planning_status = 'finalized'",
          [date_str.as_str()],
          |r| r.get(0),
        )?;
        if finalized > 0 {
          return Ok(Err(Error::Core(CoreError::DayFinalized(date))));
        }
        let deleted =
          tx.execute("DELETE FROM daily_assignments WHERE date = ?1", [date_str.as_str()])?;
        tx.commit()?;
        Ok(Ok(deleted as u64))
      })
      .await??;

    Ok(deleted)
  }

  async fn set_loading_status(
    &self,
    assignment_id: Uuid,
    status: LoadingStatus,
  ) -> Result<DailyAssignment> {
    let id_str     = encode_uuid(assignment_id);
    let status_str = encode_loading_status(status).to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE daily_assignments SET loading_status = ?1 WHERE assignment_id = ?2",
          rusqlite::params![status_str, id_str],
        )?;
        if affected == 0 {
          return Ok(None);
        }
        Ok(assignment_by_id(conn, &id_str)?)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_assignment(),
      None => Err(Error::Core(CoreError::AssignmentNotFound(assignment_id))),
    }
  }

  async fn list_finalized(&self, date: NaiveDate) -> Result<Vec<DailyAssignment>> {
    let date_str = encode_date(date);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ASSIGNMENT_COLS} FROM daily_assignments
           WHERE date = ?1 AND planning_status = 'finalized'
           ORDER BY sort_order, created_at"
        ))?;
        let rows = stmt
          .query_map([date_str], RawAssignment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAssignment::into_assignment).collect()
  }

  // ── Loader crews ──────────────────────────────────────────────────────────

  async fn add_crew_member(
    &self,
    assignment_id: Uuid,
    loader_id: Uuid,
  ) -> Result<CrewAssignment> {
    let crew = CrewAssignment {
      crew_id: Uuid::new_v4(),
      assignment_id,
      loader_id,
      created_at: Utc::now(),
    };

    let crew_id_str   = encode_uuid(crew.crew_id);
    let assignment_str = encode_uuid(assignment_id);
    let loader_str    = encode_uuid(loader_id);
    let at_str        = encode_dt(crew.created_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let loading: Option<String> = tx
          .query_row(
            "SELECT loading_status FROM daily_assignments WHERE assignment_id = ?1",
            [assignment_str.as_str()],
            |r| r.get(0),
          )
          .optional()?;
        let Some(loading) = loading else {
          return Ok(Err(Error::Core(CoreError::AssignmentNotFound(assignment_id))));
        };

        let loader_exists: bool = tx
          .query_row(
            "SELECT 1 FROM loaders WHERE loader_id = ?1",
            [loader_str.as_str()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !loader_exists {
          return Ok(Err(Error::Core(CoreError::LoaderNotFound(loader_id))));
        }

        let duplicate: bool = tx
          .query_row(
            "SELECT 1 FROM assignment_loaders
             WHERE assignment_id = ?1 AND loader_id = ?2",
            rusqlite::params![assignment_str, loader_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if duplicate {
          return Ok(Err(Error::Core(CoreError::DuplicateCrewMember {
            assignment_id,
            loader_id,
          })));
        }

        let prior: i64 = tx.query_row(
          "SELECT COUNT(*) FROM assignment_loaders WHERE assignment_id = ?1",
          [assignment_str.as_str()],
          |r| r.get(0),
        )?;

        tx.execute(
          "INSERT INTO assignment_loaders (crew_id, assignment_id, loader_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![crew_id_str, assignment_str, loader_str, at_str],
        )?;

        // First crew member starts the clock; later additions do not.
        if prior == 0 && loading == "not_started" {
          tx.execute(
            "UPDATE daily_assignments SET loading_status = 'in_progress'
             WHERE assignment_id = ?1",
            [assignment_str.as_str()],
          )?;
        }

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(crew)
  }

  async fn remove_crew_member(&self, crew_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(crew_id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM assignment_loaders WHERE crew_id = ?1", [id_str])?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::Core(CoreError::CrewNotFound(crew_id)));
    }
    Ok(())
  }

  async fn list_crew(&self, date: NaiveDate) -> Result<Vec<CrewAssignment>> {
    let date_str = encode_date(date);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CREW_COLS} FROM assignment_loaders
           WHERE assignment_id IN
             (SELECT assignment_id FROM daily_assignments WHERE date = ?1)
           ORDER BY created_at"
        ))?;
        let rows = stmt
          .query_map([date_str], RawCrew::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCrew::into_crew).collect()
  }

  // ── Dock doors ────────────────────────────────────────────────────────────

  async fn dock_snapshot(&self, date: NaiveDate) -> Result<DockSnapshot> {
    let date_str = encode_date(date);

    type RawYard = (String, String, Option<String>, String, Option<String>);

    let (doors, pool): (Vec<RawDoor>, Vec<RawYard>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DOOR_COLS} FROM door_assignments
           WHERE date = ?1 AND removed_at IS NULL
           ORDER BY door_number"
        ))?;
        let doors = stmt
          .query_map([date_str.as_str()], RawDoor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT a.assignment_id, a.trailer_id, a.route_id,
                  a.loading_status, a.dispatch_time
           FROM daily_assignments a
           LEFT JOIN door_assignments d
             ON d.daily_assignment_id = a.assignment_id AND d.removed_at IS NULL
           WHERE a.date = ?1
             AND a.planning_status = 'finalized'
             AND a.trailer_id IS NOT NULL
             AND d.door_id IS NULL
           ORDER BY (a.dispatch_time IS NULL), a.dispatch_time, a.sort_order",
        )?;
        let pool = stmt
          .query_map([date_str.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((doors, pool))
      })
      .await?;

    let doors = doors
      .into_iter()
      .map(RawDoor::into_door)
      .collect::<Result<Vec<_>>>()?;

    let unassigned = pool
      .into_iter()
      .map(|(assignment_id, trailer_id, route_id, loading, time)| {
        Ok(YardTrailer {
          assignment_id:  decode_uuid(&assignment_id)?,
          trailer_id:     decode_uuid(&trailer_id)?,
          route_id:       decode_opt_uuid(route_id.as_deref())?,
          loading_status: decode_loading_status(&loading)?,
          dispatch_time:  time.as_deref().map(decode_time).transpose()?,
        })
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(DockSnapshot { date, doors, unassigned })
  }

  async fn assign_door(&self, input: NewDoorAssignment) -> Result<DoorAssignment> {
    if !DOOR_NUMBERS.contains(&input.door_number) {
      return Err(Error::Core(CoreError::InvalidDoor(input.door_number)));
    }

    let door = DoorAssignment {
      door_id:             Uuid::new_v4(),
      door_number:         input.door_number,
      trailer_id:          input.trailer_id,
      daily_assignment_id: input.daily_assignment_id,
      date:                input.date,
      move_status:         MoveStatus::AtDoor,
      assigned_at:         Utc::now(),
      removed_at:          None,
    };

    let door_id_str    = encode_uuid(door.door_id);
    let door_number    = door.door_number as i64;
    let trailer_str    = encode_uuid(door.trailer_id);
    let assignment_str = door.daily_assignment_id.map(encode_uuid);
    let date           = door.date;
    let date_str       = encode_date(door.date);
    let at_str         = encode_dt(door.assigned_at);
    let trailer_id     = door.trailer_id;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let trailer_exists: bool = tx
          .query_row(
            "SELECT 1 FROM trailers WHERE trailer_id = ?1",
            [trailer_str.as_str()],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !trailer_exists {
          return Ok(Err(Error::Core(CoreError::TrailerNotFound(
            trailer_id.to_string(),
          ))));
        }

        if let Some(assignment_str) = &assignment_str {
          let assignment_uuid = match decode_uuid(assignment_str) {
            Ok(id) => id,
            Err(e) => return Ok(Err(e)),
          };
          let exists: bool = tx
            .query_row(
              "SELECT 1 FROM daily_assignments WHERE assignment_id = ?1",
              [assignment_str.as_str()],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if !exists {
            return Ok(Err(Error::Core(CoreError::AssignmentNotFound(assignment_uuid))));
          }

          let docked: bool = tx
            .query_row(
              "SELECT 1 FROM door_assignments
               WHERE daily_assignment_id = ?1 AND removed_at IS NULL",
              [assignment_str.as_str()],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          if docked {
            return Ok(Err(Error::Core(CoreError::TrailerAlreadyDocked(assignment_uuid))));
          }
        }

        let occupied: bool = tx
          .query_row(
            "SELECT 1 FROM door_assignments
             WHERE door_number = ?1 AND date = ?2 AND removed_at IS NULL",
            rusqlite::params![door_number, date_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if occupied {
          return Ok(Err(Error::Core(CoreError::DoorOccupied {
            door: door_number as u8,
            date,
          })));
        }

        tx.execute(
          "INSERT INTO door_assignments (
             door_id, door_number, trailer_id, daily_assignment_id, date,
             move_status, assigned_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, 'at_door', ?6)",
          rusqlite::params![
            door_id_str, door_number, trailer_str, assignment_str, date_str, at_str,
          ],
        )?;

        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    Ok(door)
  }

  async fn set_move_status(
    &self,
    door_id: Uuid,
    status: MoveStatus,
  ) -> Result<DoorAssignment> {
    let id_str     = encode_uuid(door_id);
    let status_str = encode_move_status(status).to_owned();
    let now_str    = encode_dt(Utc::now());
    let departing  = status == MoveStatus::Departed;

    let raw = self
      .conn
      .call(move |conn| {
        let affected = if departing {
          conn.execute(
            "UPDATE door_assignments
             SET move_status = ?1, removed_at = COALESCE(removed_at, ?2)
             WHERE door_id = ?3",
            rusqlite::params![status_str, now_str, id_str],
          )?
        } else {
          conn.execute(
            "UPDATE door_assignments SET move_status = ?1 WHERE door_id = ?2",
            rusqlite::params![status_str, id_str],
          )?
        };
        if affected == 0 {
          return Ok(None);
        }
        Ok(door_by_id(conn, &id_str)?)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_door(),
      None => Err(Error::Core(CoreError::DoorNotFound(door_id))),
    }
  }

  async fn clear_door(&self, door_id: Uuid) -> Result<DoorAssignment> {
    let id_str  = encode_uuid(door_id);
    let now_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE door_assignments SET removed_at = ?1
           WHERE door_id = ?2 AND removed_at IS NULL",
          rusqlite::params![now_str, id_str],
        )?;
        if affected == 0 {
          return Ok(None);
        }
        Ok(door_by_id(conn, &id_str)?)
      })
      .await?;

    match raw {
      Some(raw) => raw.into_door(),
      None => Err(Error::Core(CoreError::DoorNotFound(door_id))),
    }
  }
}
