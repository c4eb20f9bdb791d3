//! Error types for `dockboard-core`.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("template row not found: {0}")]
  TemplateNotFound(Uuid),

  #[error("daily assignment not found: {0}")]
  AssignmentNotFound(Uuid),

  #[error("door assignment not found: {0}")]
  DoorNotFound(Uuid),

  #[error("loader not found: {0}")]
  LoaderNotFound(Uuid),

  #[error("crew assignment not found: {0}")]
  CrewNotFound(Uuid),

  #[error("trailer {0:?} not found")]
  TrailerNotFound(String),

  #[error("no routes to finalize for {0}")]
  EmptyRoster(NaiveDate),

  #[error("{0} already has daily assignments")]
  AlreadyMaterialized(NaiveDate),

  #[error("row comes from the weekly template; edit the template to remove it")]
  TemplateSourcedRow(Uuid),

  #[error("{0} is finalized; unfinalize it before resetting to the template")]
  DayFinalized(NaiveDate),

  #[error("door {door} is already occupied on {date}")]
  DoorOccupied { door: u8, date: NaiveDate },

  #[error("assignment {0} already has a trailer at a door")]
  TrailerAlreadyDocked(Uuid),

  #[error("loader {loader_id} is already on the crew for {assignment_id}")]
  DuplicateCrewMember {
    assignment_id: Uuid,
    loader_id:     Uuid,
  },

  #[error("no dock door numbered {0}")]
  InvalidDoor(u8),

  #[error("day of week must be 1 (Monday) through 5 (Friday), got {0}")]
  InvalidWeekday(u8),

  #[error("cannot parse time of day: {0:?}")]
  InvalidTime(String),

  #[error("storage backend error: {0}")]
  Storage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
