//! Dock-door occupancy — mapping trailers onto the fixed set of physical
//! doors for a delivery date, and tracking yard movement.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  calendar::DispatchTime,
  roster::LoadingStatus,
};

/// The dock doors usable for outbound loading.
pub const DOOR_NUMBERS: std::ops::RangeInclusive<u8> = 4..=13;

/// The trailer that conventionally sits in door 4 as non-route dock storage.
pub const STORAGE_TRAILER_NUMBER: &str = "1007";

/// The door the storage trailer is pinned to.
pub const STORAGE_DOOR: u8 = 4;

// ─── Move status ─────────────────────────────────────────────────────────────

/// Physical yard-movement state of a trailer at a door. Transitions are
/// free-form user selections; entering `Departed` retires the door
/// assignment as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
  #[default]
  AtDoor,
  JockeyMoving,
  TruckIn,
  Departed,
}

// ─── Door assignments ────────────────────────────────────────────────────────

/// The physical occupancy record for one trailer at one door on one date.
/// Soft-deleted via `removed_at`; only rows with `removed_at = NULL` count
/// as occupying a door.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorAssignment {
  pub door_id:             Uuid,
  pub door_number:         u8,
  pub trailer_id:          Uuid,
  /// `None` marks a storage trailer with no route semantics.
  pub daily_assignment_id: Option<Uuid>,
  pub date:                NaiveDate,
  pub move_status:         MoveStatus,
  pub assigned_at:         DateTime<Utc>,
  pub removed_at:          Option<DateTime<Utc>>,
}

impl DoorAssignment {
  pub fn is_active(&self) -> bool { self.removed_at.is_none() }
}

/// Input to [`crate::store::ScheduleStore::assign_door`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewDoorAssignment {
  pub date:                NaiveDate,
  pub door_number:         u8,
  pub trailer_id:          Uuid,
  #[serde(default)]
  pub daily_assignment_id: Option<Uuid>,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// A finalized assignment whose trailer is in the yard but not at a door.
#[derive(Debug, Clone, Serialize)]
pub struct YardTrailer {
  pub assignment_id:  Uuid,
  pub trailer_id:     Uuid,
  pub route_id:       Option<Uuid>,
  pub loading_status: LoadingStatus,
  pub dispatch_time:  Option<DispatchTime>,
}

/// The full dock picture for one delivery date — derived from scratch on
/// every read, never cached or incrementally patched.
#[derive(Debug, Clone, Serialize)]
pub struct DockSnapshot {
  pub date:       NaiveDate,
  /// Active door assignments, ordered by door number.
  pub doors:      Vec<DoorAssignment>,
  /// The unassigned, in-yard pool.
  pub unassigned: Vec<YardTrailer>,
}

impl DockSnapshot {
  pub fn occupant(&self, door_number: u8) -> Option<&DoorAssignment> {
    self.doors.iter().find(|d| d.door_number == door_number)
  }

  pub fn occupied_count(&self) -> usize { self.doors.len() }

  pub fn empty_count(&self) -> usize {
    DOOR_NUMBERS.count().saturating_sub(self.doors.len())
  }
}
