//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Audit timestamps are stored as RFC 3339 strings; calendar dates as
//! `YYYY-MM-DD`; dispatch times as `HH:MM:SS`. Enums are stored as their
//! snake_case wire names. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use dockboard_core::{
  calendar::{DispatchTime, Workday},
  door::{DoorAssignment, MoveStatus},
  entity::{
    Driver, EntityStatus, Loader, Route, Trailer, TrailerKind, Truck, TruckKind,
  },
  roster::{
    AssignmentKind, CrewAssignment, DailyAssignment, LoadingStatus,
    PlanningStatus, RosterFields, TemplateRow,
  },
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Decode(format!("uuid {s:?}: {e}")))
}

pub fn decode_opt_uuid(s: Option<&str>) -> Result<Option<Uuid>> {
  s.map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(date: NaiveDate) -> String {
  date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn decode_time(s: &str) -> Result<DispatchTime> {
  DispatchTime::parse(s).map_err(|e| Error::Decode(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn encode_entity_status(s: EntityStatus) -> &'static str {
  match s {
    EntityStatus::Active => "active",
    EntityStatus::Inactive => "inactive",
    EntityStatus::Maintenance => "maintenance",
    EntityStatus::Retired => "retired",
  }
}

pub fn decode_entity_status(s: &str) -> Result<EntityStatus> {
  match s {
    "active" => Ok(EntityStatus::Active),
    "inactive" => Ok(EntityStatus::Inactive),
    "maintenance" => Ok(EntityStatus::Maintenance),
    "retired" => Ok(EntityStatus::Retired),
    other => Err(Error::Decode(format!("unknown entity status: {other:?}"))),
  }
}

pub fn encode_truck_kind(k: TruckKind) -> &'static str {
  match k {
    TruckKind::Tractor => "tractor",
    TruckKind::BoxTruck => "box_truck",
  }
}

pub fn decode_truck_kind(s: &str) -> Result<TruckKind> {
  match s {
    "tractor" => Ok(TruckKind::Tractor),
    "box_truck" => Ok(TruckKind::BoxTruck),
    other => Err(Error::Decode(format!("unknown truck kind: {other:?}"))),
  }
}

pub fn encode_trailer_kind(k: TrailerKind) -> &'static str {
  match k {
    TrailerKind::Standard => "standard",
    TrailerKind::Transfer => "transfer",
  }
}

pub fn decode_trailer_kind(s: &str) -> Result<TrailerKind> {
  match s {
    "standard" => Ok(TrailerKind::Standard),
    "transfer" => Ok(TrailerKind::Transfer),
    other => Err(Error::Decode(format!("unknown trailer kind: {other:?}"))),
  }
}

pub fn encode_planning_status(s: PlanningStatus) -> &'static str {
  match s {
    PlanningStatus::Draft => "draft",
    PlanningStatus::Finalized => "finalized",
  }
}

pub fn decode_planning_status(s: &str) -> Result<PlanningStatus> {
  match s {
    "draft" => Ok(PlanningStatus::Draft),
    "finalized" => Ok(PlanningStatus::Finalized),
    other => Err(Error::Decode(format!("unknown planning status: {other:?}"))),
  }
}

pub fn encode_loading_status(s: LoadingStatus) -> &'static str {
  match s {
    LoadingStatus::NotStarted => "not_started",
    LoadingStatus::InProgress => "in_progress",
    LoadingStatus::Loaded => "loaded",
  }
}

pub fn decode_loading_status(s: &str) -> Result<LoadingStatus> {
  match s {
    "not_started" => Ok(LoadingStatus::NotStarted),
    "in_progress" => Ok(LoadingStatus::InProgress),
    "loaded" => Ok(LoadingStatus::Loaded),
    other => Err(Error::Decode(format!("unknown loading status: {other:?}"))),
  }
}

pub fn encode_assignment_kind(k: AssignmentKind) -> &'static str {
  match k {
    AssignmentKind::Standard => "standard",
    AssignmentKind::Help => "help",
    AssignmentKind::Dock => "dock",
    AssignmentKind::Van => "van",
  }
}

pub fn decode_assignment_kind(s: &str) -> Result<AssignmentKind> {
  match s {
    "standard" => Ok(AssignmentKind::Standard),
    "help" => Ok(AssignmentKind::Help),
    "dock" => Ok(AssignmentKind::Dock),
    "van" => Ok(AssignmentKind::Van),
    other => Err(Error::Decode(format!("unknown assignment kind: {other:?}"))),
  }
}

pub fn encode_move_status(s: MoveStatus) -> &'static str {
  match s {
    MoveStatus::AtDoor => "at_door",
    MoveStatus::JockeyMoving => "jockey_moving",
    MoveStatus::TruckIn => "truck_in",
    MoveStatus::Departed => "departed",
  }
}

pub fn decode_move_status(s: &str) -> Result<MoveStatus> {
  match s {
    "at_door" => Ok(MoveStatus::AtDoor),
    "jockey_moving" => Ok(MoveStatus::JockeyMoving),
    "truck_in" => Ok(MoveStatus::TruckIn),
    "departed" => Ok(MoveStatus::Departed),
    other => Err(Error::Decode(format!("unknown move status: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from one of the five reference tables. Trucks,
/// trailers, and routes ignore the fields they do not carry.
pub struct RawEntity {
  pub id:          String,
  /// Name, number, or code — whichever the table keys on.
  pub display_key: String,
  pub kind:        Option<String>,
  pub description: Option<String>,
  pub notes:       Option<String>,
  pub status:      String,
  pub created_at:  String,
}

impl RawEntity {
  /// Column order: id, display key, kind, description, notes, status,
  /// created_at — tables without a column select NULL in its place.
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      display_key: row.get(1)?,
      kind:        row.get(2)?,
      description: row.get(3)?,
      notes:       row.get(4)?,
      status:      row.get(5)?,
      created_at:  row.get(6)?,
    })
  }

  pub fn into_driver(self) -> Result<Driver> {
    Ok(Driver {
      driver_id:  decode_uuid(&self.id)?,
      name:       self.display_key,
      status:     decode_entity_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  pub fn into_truck(self) -> Result<Truck> {
    Ok(Truck {
      truck_id:   decode_uuid(&self.id)?,
      number:     self.display_key,
      kind:       decode_truck_kind(self.kind.as_deref().unwrap_or("tractor"))?,
      status:     decode_entity_status(&self.status)?,
      notes:      self.notes,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  pub fn into_trailer(self) -> Result<Trailer> {
    Ok(Trailer {
      trailer_id: decode_uuid(&self.id)?,
      number:     self.display_key,
      kind:       decode_trailer_kind(self.kind.as_deref().unwrap_or("standard"))?,
      status:     decode_entity_status(&self.status)?,
      notes:      self.notes,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  pub fn into_loader(self) -> Result<Loader> {
    Ok(Loader {
      loader_id:  decode_uuid(&self.id)?,
      name:       self.display_key,
      status:     decode_entity_status(&self.status)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }

  pub fn into_route(self) -> Result<Route> {
    Ok(Route {
      route_id:    decode_uuid(&self.id)?,
      code:        self.display_key,
      description: self.description,
      status:      decode_entity_status(&self.status)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// The shared roster payload as stored.
pub struct RawRosterFields {
  pub route_id:      Option<String>,
  pub driver_id:     Option<String>,
  pub truck_id:      Option<String>,
  pub trailer_id:    Option<String>,
  pub dispatch_time: Option<String>,
  pub backhaul:      Option<String>,
  pub notes:         Option<String>,
}

impl RawRosterFields {
  pub fn into_fields(self) -> Result<RosterFields> {
    Ok(RosterFields {
      route_id:      decode_opt_uuid(self.route_id.as_deref())?,
      driver_id:     decode_opt_uuid(self.driver_id.as_deref())?,
      truck_id:      decode_opt_uuid(self.truck_id.as_deref())?,
      trailer_id:    decode_opt_uuid(self.trailer_id.as_deref())?,
      dispatch_time: self.dispatch_time.as_deref().map(decode_time).transpose()?,
      backhaul:      self.backhaul,
      notes:         self.notes,
    })
  }
}

/// Raw strings read directly from a `weekly_templates` row.
pub struct RawTemplate {
  pub template_id: String,
  pub day_of_week: i64,
  pub fields:      RawRosterFields,
  pub sort_order:  i64,
  pub created_at:  String,
}

impl RawTemplate {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      template_id: row.get(0)?,
      day_of_week: row.get(1)?,
      fields:      RawRosterFields {
        route_id:      row.get(2)?,
        driver_id:     row.get(3)?,
        truck_id:      row.get(4)?,
        trailer_id:    row.get(5)?,
        dispatch_time: row.get(6)?,
        backhaul:      row.get(7)?,
        notes:         row.get(8)?,
      },
      sort_order:  row.get(9)?,
      created_at:  row.get(10)?,
    })
  }

  pub fn into_template(self) -> Result<TemplateRow> {
    Ok(TemplateRow {
      template_id: decode_uuid(&self.template_id)?,
      day_of_week: Workday::from_number(self.day_of_week as u8)
        .map_err(|e| Error::Decode(e.to_string()))?,
      fields:      self.fields.into_fields()?,
      sort_order:  self.sort_order,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `daily_assignments` row.
pub struct RawAssignment {
  pub assignment_id:          String,
  pub date:                   String,
  pub kind:                   String,
  pub fields:                 RawRosterFields,
  pub planning_status:        String,
  pub loading_status:         String,
  pub modified_from_template: bool,
  pub sort_order:             i64,
  pub created_at:             String,
}

impl RawAssignment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      assignment_id:          row.get(0)?,
      date:                   row.get(1)?,
      kind:                   row.get(2)?,
      fields:                 RawRosterFields {
        route_id:      row.get(3)?,
        driver_id:     row.get(4)?,
        truck_id:      row.get(5)?,
        trailer_id:    row.get(6)?,
        dispatch_time: row.get(7)?,
        backhaul:      row.get(8)?,
        notes:         row.get(9)?,
      },
      planning_status:        row.get(10)?,
      loading_status:         row.get(11)?,
      modified_from_template: row.get(12)?,
      sort_order:             row.get(13)?,
      created_at:             row.get(14)?,
    })
  }

  pub fn into_assignment(self) -> Result<DailyAssignment> {
    Ok(DailyAssignment {
      assignment_id:          decode_uuid(&self.assignment_id)?,
      date:                   decode_date(&self.date)?,
      kind:                   decode_assignment_kind(&self.kind)?,
      fields:                 self.fields.into_fields()?,
      planning_status:        decode_planning_status(&self.planning_status)?,
      loading_status:         decode_loading_status(&self.loading_status)?,
      modified_from_template: self.modified_from_template,
      sort_order:             self.sort_order,
      created_at:             decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `door_assignments` row.
pub struct RawDoor {
  pub door_id:             String,
  pub door_number:         i64,
  pub trailer_id:          String,
  pub daily_assignment_id: Option<String>,
  pub date:                String,
  pub move_status:         String,
  pub assigned_at:         String,
  pub removed_at:          Option<String>,
}

impl RawDoor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      door_id:             row.get(0)?,
      door_number:         row.get(1)?,
      trailer_id:          row.get(2)?,
      daily_assignment_id: row.get(3)?,
      date:                row.get(4)?,
      move_status:         row.get(5)?,
      assigned_at:         row.get(6)?,
      removed_at:          row.get(7)?,
    })
  }

  pub fn into_door(self) -> Result<DoorAssignment> {
    Ok(DoorAssignment {
      door_id:             decode_uuid(&self.door_id)?,
      door_number:         self.door_number as u8,
      trailer_id:          decode_uuid(&self.trailer_id)?,
      daily_assignment_id: decode_opt_uuid(self.daily_assignment_id.as_deref())?,
      date:                decode_date(&self.date)?,
      move_status:         decode_move_status(&self.move_status)?,
      assigned_at:         decode_dt(&self.assigned_at)?,
      removed_at:          self.removed_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Raw strings read directly from an `assignment_loaders` row.
pub struct RawCrew {
  pub crew_id:       String,
  pub assignment_id: String,
  pub loader_id:     String,
  pub created_at:    String,
}

impl RawCrew {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      crew_id:       row.get(0)?,
      assignment_id: row.get(1)?,
      loader_id:     row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_crew(self) -> Result<CrewAssignment> {
    Ok(CrewAssignment {
      crew_id:       decode_uuid(&self.crew_id)?,
      assignment_id: decode_uuid(&self.assignment_id)?,
      loader_id:     decode_uuid(&self.loader_id)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
