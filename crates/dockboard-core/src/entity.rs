//! Reference entities — the master records the schedule points at.
//!
//! Drivers, trucks, trailers, loaders, and routes are shared rows referenced
//! by id from template and assignment rows; the schedule never owns them.
//! Identity is immutable, status is not.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Availability of a reference entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
  #[default]
  Active,
  Inactive,
  Maintenance,
  Retired,
}

impl EntityStatus {
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

// ─── Equipment kinds ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckKind {
  #[default]
  Tractor,
  /// A box truck runs without a trailer.
  BoxTruck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailerKind {
  #[default]
  Standard,
  /// Transfer trailers are pooled and displayed by role, not by number.
  Transfer,
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
  pub driver_id:  Uuid,
  pub name:       String,
  pub status:     EntityStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
  pub truck_id:   Uuid,
  /// Fleet number painted on the cab, e.g. `"88"`. Unique.
  pub number:     String,
  pub kind:       TruckKind,
  pub status:     EntityStatus,
  pub notes:      Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trailer {
  pub trailer_id: Uuid,
  /// Equipment number, e.g. `"1027"`. Unique.
  pub number:     String,
  pub kind:       TrailerKind,
  pub status:     EntityStatus,
  pub notes:      Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loader {
  pub loader_id:  Uuid,
  pub name:       String,
  pub status:     EntityStatus,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
  pub route_id:    Uuid,
  /// Short route code, e.g. `"R12"`. Unique.
  pub code:        String,
  pub description: Option<String>,
  pub status:      EntityStatus,
  pub created_at:  DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::ScheduleStore::add_driver`]. The id and creation
/// timestamp are assigned by the store; the same holds for the other `New*`
/// inputs below.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDriver {
  pub name:   String,
  #[serde(default)]
  pub status: EntityStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTruck {
  pub number: String,
  #[serde(default)]
  pub kind:   TruckKind,
  #[serde(default)]
  pub status: EntityStatus,
  #[serde(default)]
  pub notes:  Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrailer {
  pub number: String,
  #[serde(default)]
  pub kind:   TrailerKind,
  #[serde(default)]
  pub status: EntityStatus,
  #[serde(default)]
  pub notes:  Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLoader {
  pub name:   String,
  #[serde(default)]
  pub status: EntityStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoute {
  pub code:        String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub status:      EntityStatus,
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// A point-in-time snapshot of every reference table, keyed by id.
///
/// Read models join against this instead of issuing one lookup per row; the
/// tables are small (tens of rows) and a single snapshot keeps a view
/// internally consistent.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
  pub drivers:  HashMap<Uuid, Driver>,
  pub trucks:   HashMap<Uuid, Truck>,
  pub trailers: HashMap<Uuid, Trailer>,
  pub loaders:  HashMap<Uuid, Loader>,
  pub routes:   HashMap<Uuid, Route>,
}

impl ReferenceCatalog {
  pub fn route_code(&self, id: Option<Uuid>) -> Option<&str> {
    id.and_then(|id| self.routes.get(&id)).map(|r| r.code.as_str())
  }

  pub fn driver_name(&self, id: Option<Uuid>) -> Option<&str> {
    id.and_then(|id| self.drivers.get(&id)).map(|d| d.name.as_str())
  }

  pub fn truck_number(&self, id: Option<Uuid>) -> Option<&str> {
    id.and_then(|id| self.trucks.get(&id)).map(|t| t.number.as_str())
  }

  pub fn trailer_number(&self, id: Option<Uuid>) -> Option<&str> {
    id.and_then(|id| self.trailers.get(&id)).map(|t| t.number.as_str())
  }

  pub fn loader_name(&self, id: Uuid) -> Option<&str> {
    self.loaders.get(&id).map(|l| l.name.as_str())
  }

  /// The equipment label for a truck/trailer pairing, e.g. `"88-1027"`.
  /// Box trucks show the truck number alone; transfer trailers show as
  /// `"<truck>-Transfer"`. `None` when no truck is assigned.
  pub fn equipment_label(
    &self,
    truck_id:   Option<Uuid>,
    trailer_id: Option<Uuid>,
  ) -> Option<String> {
    let truck = truck_id.and_then(|id| self.trucks.get(&id))?;
    let Some(trailer) = trailer_id.and_then(|id| self.trailers.get(&id)) else {
      return Some(truck.number.clone());
    };
    match trailer.kind {
      TrailerKind::Transfer => Some(format!("{}-Transfer", truck.number)),
      TrailerKind::Standard => Some(format!("{}-{}", truck.number, trailer.number)),
    }
  }
}
