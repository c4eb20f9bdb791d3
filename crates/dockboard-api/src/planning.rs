//! Handler for the planning grid — complete Monday–Friday weeks, each day
//! annotated with the delivery date it prepares.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use dockboard_core::{
  calendar::{self, Workday},
  store::ScheduleStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct PlanningDay {
  pub date:          NaiveDate,
  pub day_name:      Option<&'static str>,
  /// The next business day — the deliveries this day's work prepares.
  pub delivery_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct PlanningWeek {
  pub week: usize,
  pub days: Vec<PlanningDay>,
}

fn default_weeks() -> usize { 4 }

#[derive(Debug, Deserialize)]
pub struct WorkweeksParams {
  #[serde(default = "default_weeks")]
  pub weeks: usize,
  /// Grid anchor; defaults to today. The grid always starts at the Monday of
  /// the anchor's week.
  pub from:  Option<NaiveDate>,
}

/// `GET /planning/workweeks?weeks=N&from=DATE`
pub async fn workweeks<S>(
  State(_store): State<Arc<S>>,
  Query(params): Query<WorkweeksParams>,
) -> Result<Json<Vec<PlanningWeek>>, ApiError>
where
  S: ScheduleStore,
  S::Error: Into<dockboard_core::Error>,
{
  let from = params.from.unwrap_or_else(|| Local::now().date_naive());
  let weeks = params.weeks.clamp(1, 52);

  let grid = calendar::workweeks(from, weeks)
    .into_iter()
    .enumerate()
    .map(|(index, days)| PlanningWeek {
      week: index + 1,
      days: days
        .into_iter()
        .map(|date| PlanningDay {
          date,
          day_name:      Workday::of(date).map(Workday::name),
          delivery_date: calendar::next_business_day(date),
        })
        .collect(),
    })
    .collect();

  Ok(Json(grid))
}
