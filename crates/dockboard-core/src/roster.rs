//! Roster types — weekly templates, daily assignments, and the resolved
//! day view.
//!
//! A weekly template row is the recurring default for one weekday. A daily
//! assignment is the date-specific, materialized instance of a roster line.
//! A date is either *virtual* (no assignment rows; the weekday's templates
//! are displayed read-only) or *materialized* (assignment rows exist); the
//! transition from one to the other is the promotion step, which always
//! copies every template row of the day at once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::calendar::{DispatchTime, Workday};

// ─── Statuses ────────────────────────────────────────────────────────────────

/// Draft vs finalized state of a date's roster. Uniform across all rows of a
/// date; finalize and unfinalize always act on the whole date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanningStatus {
  #[default]
  Draft,
  Finalized,
}

impl PlanningStatus {
  pub fn is_finalized(&self) -> bool { matches!(self, Self::Finalized) }
}

/// Warehouse loading progress for one assignment. Only meaningful once the
/// date is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStatus {
  #[default]
  NotStarted,
  InProgress,
  Loaded,
}

/// What kind of dispatch a daily assignment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
  #[default]
  Standard,
  Help,
  Dock,
  Van,
}

// ─── Shared payload ──────────────────────────────────────────────────────────

/// The planner-editable payload shared by template rows and daily
/// assignments. Promotion copies this wholesale from template to assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterFields {
  pub route_id:      Option<Uuid>,
  pub driver_id:     Option<Uuid>,
  pub truck_id:      Option<Uuid>,
  pub trailer_id:    Option<Uuid>,
  pub dispatch_time: Option<DispatchTime>,
  pub backhaul:      Option<String>,
  pub notes:         Option<String>,
}

// ─── Template rows ───────────────────────────────────────────────────────────

/// One line of the recurring weekday default. Many rows per weekday, ordered
/// by `sort_order`; they never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRow {
  pub template_id: Uuid,
  pub day_of_week: Workday,
  #[serde(flatten)]
  pub fields:      RosterFields,
  pub sort_order:  i64,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ScheduleStore::add_template`]. The sort order is
/// assigned by the store (end of the day's list).
#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
  pub day_of_week: Workday,
  #[serde(flatten)]
  pub fields:      RosterFields,
}

impl NewTemplate {
  pub fn empty(day_of_week: Workday) -> Self {
    Self { day_of_week, fields: RosterFields::default() }
  }
}

// ─── Daily assignments ───────────────────────────────────────────────────────

/// The date-specific, materialized instance of a roster line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyAssignment {
  pub assignment_id:          Uuid,
  pub date:                   NaiveDate,
  pub kind:                   AssignmentKind,
  #[serde(flatten)]
  pub fields:                 RosterFields,
  pub planning_status:        PlanningStatus,
  pub loading_status:         LoadingStatus,
  /// Set once a field edit lands on this row; promotion copies start false.
  pub modified_from_template: bool,
  pub sort_order:             i64,
  pub created_at:             DateTime<Utc>,
}

// ─── Patches ─────────────────────────────────────────────────────────────────

/// A partial update of [`RosterFields`].
///
/// Outer `None` = leave the field untouched; `Some(None)` = clear it;
/// `Some(Some(v))` = set it. On the wire: an absent key is untouched, an
/// explicit `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterPatch {
  #[serde(default, deserialize_with = "double_option")]
  pub route_id:      Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "double_option")]
  pub driver_id:     Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "double_option")]
  pub truck_id:      Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "double_option")]
  pub trailer_id:    Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "double_option")]
  pub dispatch_time: Option<Option<DispatchTime>>,
  #[serde(default, deserialize_with = "double_option")]
  pub backhaul:      Option<Option<String>>,
  #[serde(default, deserialize_with = "double_option")]
  pub notes:         Option<Option<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl RosterPatch {
  pub fn is_empty(&self) -> bool {
    self.route_id.is_none()
      && self.driver_id.is_none()
      && self.truck_id.is_none()
      && self.trailer_id.is_none()
      && self.dispatch_time.is_none()
      && self.backhaul.is_none()
      && self.notes.is_none()
  }

  /// Fold the patch into an existing payload.
  pub fn apply(&self, fields: &mut RosterFields) {
    if let Some(v) = &self.route_id {
      fields.route_id = *v;
    }
    if let Some(v) = &self.driver_id {
      fields.driver_id = *v;
    }
    if let Some(v) = &self.truck_id {
      fields.truck_id = *v;
    }
    if let Some(v) = &self.trailer_id {
      fields.trailer_id = *v;
    }
    if let Some(v) = &self.dispatch_time {
      fields.dispatch_time = *v;
    }
    if let Some(v) = &self.backhaul {
      fields.backhaul = v.clone();
    }
    if let Some(v) = &self.notes {
      fields.notes = v.clone();
    }
  }
}

// ─── Row references ──────────────────────────────────────────────────────────

/// Which backing row a day-view edit targets. Template references trigger
/// promotion; the update is then applied to the assignment created from
/// exactly that template row, never re-derived by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRef {
  Template(Uuid),
  Assignment(Uuid),
}

// ─── Resolved day view ───────────────────────────────────────────────────────

/// Where a resolved roster row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
  Template,
  Assignment,
}

/// One displayable roster line, whether template-backed or materialized.
#[derive(Debug, Clone, Serialize)]
pub struct RosterRow {
  pub source:                 RosterSource,
  /// Template id or assignment id, depending on `source`.
  pub id:                     Uuid,
  #[serde(flatten)]
  pub fields:                 RosterFields,
  pub planning_status:        PlanningStatus,
  pub loading_status:         LoadingStatus,
  pub modified_from_template: bool,
  pub sort_order:             i64,
}

impl RosterRow {
  pub fn from_template(row: &TemplateRow) -> Self {
    Self {
      source:                 RosterSource::Template,
      id:                     row.template_id,
      fields:                 row.fields.clone(),
      planning_status:        PlanningStatus::Draft,
      loading_status:         LoadingStatus::NotStarted,
      modified_from_template: false,
      sort_order:             row.sort_order,
    }
  }

  pub fn from_assignment(row: &DailyAssignment) -> Self {
    Self {
      source:                 RosterSource::Assignment,
      id:                     row.assignment_id,
      fields:                 row.fields.clone(),
      planning_status:        row.planning_status,
      loading_status:         row.loading_status,
      modified_from_template: row.modified_from_template,
      sort_order:             row.sort_order,
    }
  }

  pub fn row_ref(&self) -> RowRef {
    match self.source {
      RosterSource::Template => RowRef::Template(self.id),
      RosterSource::Assignment => RowRef::Assignment(self.id),
    }
  }
}

/// The resolved read model for one calendar date — derived, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct DayRoster {
  pub date:         NaiveDate,
  /// True when assignment rows exist for the date.
  pub materialized: bool,
  /// True when any assignment row is finalized (they move together).
  pub finalized:    bool,
  pub rows:         Vec<RosterRow>,
}

impl DayRoster {
  pub fn virtual_day(date: NaiveDate, templates: &[TemplateRow]) -> Self {
    Self {
      date,
      materialized: false,
      finalized:    false,
      rows:         templates.iter().map(RosterRow::from_template).collect(),
    }
  }

  pub fn materialized_day(date: NaiveDate, assignments: &[DailyAssignment]) -> Self {
    Self {
      date,
      materialized: true,
      finalized:    assignments
        .iter()
        .any(|a| a.planning_status.is_finalized()),
      rows:         assignments.iter().map(RosterRow::from_assignment).collect(),
    }
  }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

// ─── Loader crews ────────────────────────────────────────────────────────────

/// Join row putting one loader on one assignment's crew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewAssignment {
  pub crew_id:       Uuid,
  pub assignment_id: Uuid,
  pub loader_id:     Uuid,
  pub created_at:    DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn patch_distinguishes_absent_from_null() {
    let patch: RosterPatch =
      serde_json::from_str(r#"{"backhaul": "Acme Corp", "notes": null}"#).unwrap();

    let mut fields = RosterFields {
      backhaul: Some("Old".into()),
      notes: Some("keep me out".into()),
      dispatch_time: Some(DispatchTime::parse("05:30:00").unwrap()),
      ..Default::default()
    };
    patch.apply(&mut fields);

    assert_eq!(fields.backhaul.as_deref(), Some("Acme Corp"));
    assert_eq!(fields.notes, None);
    // Untouched field survives.
    assert!(fields.dispatch_time.is_some());
  }

  #[test]
  fn empty_patch_is_detected() {
    let patch: RosterPatch = serde_json::from_str("{}").unwrap();
    assert!(patch.is_empty());
  }
}
