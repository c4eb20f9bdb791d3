//! Business-day arithmetic and time-of-day handling.
//!
//! Dates are plain `NaiveDate` values interpreted in local wall-clock time and
//! persisted as `YYYY-MM-DD` strings — never UTC-shifted. The dispatch week
//! runs Monday through Friday; weekends carry no templates.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

// ─── Workday ─────────────────────────────────────────────────────────────────

/// A weekday that can carry template rows. Numbered 1 (Monday) through
/// 5 (Friday), matching the persisted `day_of_week` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Workday {
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
}

impl Workday {
  pub const ALL: [Workday; 5] = [
    Workday::Monday,
    Workday::Tuesday,
    Workday::Wednesday,
    Workday::Thursday,
    Workday::Friday,
  ];

  /// The persisted number, 1 = Monday through 5 = Friday.
  pub fn number(self) -> u8 {
    match self {
      Workday::Monday => 1,
      Workday::Tuesday => 2,
      Workday::Wednesday => 3,
      Workday::Thursday => 4,
      Workday::Friday => 5,
    }
  }

  pub fn from_number(n: u8) -> Result<Self> {
    match n {
      1 => Ok(Workday::Monday),
      2 => Ok(Workday::Tuesday),
      3 => Ok(Workday::Wednesday),
      4 => Ok(Workday::Thursday),
      5 => Ok(Workday::Friday),
      other => Err(Error::InvalidWeekday(other)),
    }
  }

  /// The workday a calendar date falls on; `None` for weekends.
  pub fn of(date: NaiveDate) -> Option<Self> {
    match date.weekday() {
      Weekday::Mon => Some(Workday::Monday),
      Weekday::Tue => Some(Workday::Tuesday),
      Weekday::Wed => Some(Workday::Wednesday),
      Weekday::Thu => Some(Workday::Thursday),
      Weekday::Fri => Some(Workday::Friday),
      Weekday::Sat | Weekday::Sun => None,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Workday::Monday => "Monday",
      Workday::Tuesday => "Tuesday",
      Workday::Wednesday => "Wednesday",
      Workday::Thursday => "Thursday",
      Workday::Friday => "Friday",
    }
  }
}

impl Serialize for Workday {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(self.number())
  }
}

impl<'de> Deserialize<'de> for Workday {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let n = u8::deserialize(deserializer)?;
    Workday::from_number(n).map_err(serde::de::Error::custom)
  }
}

// ─── Date arithmetic ─────────────────────────────────────────────────────────

pub fn is_weekend(date: NaiveDate) -> bool {
  matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The next business day strictly after `date`: Friday (and Saturday) roll to
/// Monday, every other day rolls to the following day.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
  let mut next = date + Days::new(1);
  while is_weekend(next) {
    next = next + Days::new(1);
  }
  next
}

/// The Monday of the week `date` falls in.
pub fn week_start(date: NaiveDate) -> NaiveDate {
  date - Days::new(date.weekday().num_days_from_monday() as u64)
}

/// `weeks` complete Monday–Friday weeks, starting from the Monday of the week
/// `from` falls in. Each inner vector holds exactly five dates.
pub fn workweeks(from: NaiveDate, weeks: usize) -> Vec<Vec<NaiveDate>> {
  let monday = week_start(from);
  (0..weeks)
    .map(|week| {
      (0..5u64)
        .map(|day| monday + Days::new(week as u64 * 7 + day))
        .collect()
    })
    .collect()
}

// ─── Dispatch time ───────────────────────────────────────────────────────────

/// A time of day a route leaves the yard. Persisted as `HH:MM:SS`; displayed
/// as `h:MMam`/`h:MMpm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DispatchTime(NaiveTime);

impl DispatchTime {
  pub fn new(time: NaiveTime) -> Self { Self(time) }

  /// Parse either the storage form (`05:30:00`, `05:30`) or the display form
  /// (`5:30am`, `5:30 PM`).
  pub fn parse(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    for fmt in ["%H:%M:%S", "%H:%M"] {
      if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
        return Ok(Self(t));
      }
    }

    let lower = trimmed.to_ascii_lowercase();
    let (clock, meridiem) = if let Some(rest) = lower.strip_suffix("am") {
      (rest.trim_end(), Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
      (rest.trim_end(), Some(true))
    } else {
      (lower.as_str(), None)
    };

    let (h_str, m_str) = clock
      .split_once(':')
      .ok_or_else(|| Error::InvalidTime(s.to_string()))?;
    let hours: u32 = h_str
      .parse()
      .map_err(|_| Error::InvalidTime(s.to_string()))?;
    let minutes: u32 = m_str
      .parse()
      .map_err(|_| Error::InvalidTime(s.to_string()))?;

    let hours = match meridiem {
      Some(true) if hours != 12 => hours + 12,
      Some(false) if hours == 12 => 0,
      _ => hours,
    };

    NaiveTime::from_hms_opt(hours, minutes, 0)
      .map(Self)
      .ok_or_else(|| Error::InvalidTime(s.to_string()))
  }

  /// The persisted `HH:MM:SS` form.
  pub fn storage(&self) -> String { self.0.format("%H:%M:%S").to_string() }

  /// The display form, e.g. `5:30am`.
  pub fn display(&self) -> String {
    let hour24 = self.0.hour();
    let meridiem = if hour24 >= 12 { "pm" } else { "am" };
    let hour12 = match hour24 % 12 {
      0 => 12,
      h => h,
    };
    format!("{hour12}:{:02}{meridiem}", self.0.minute())
  }
}

impl fmt::Display for DispatchTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.display())
  }
}

impl std::str::FromStr for DispatchTime {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl Serialize for DispatchTime {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&self.storage())
  }
}

impl<'de> Deserialize<'de> for DispatchTime {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    DispatchTime::parse(&s).map_err(serde::de::Error::custom)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn friday_rolls_to_monday() {
    // 2024-01-12 is a Friday.
    assert_eq!(next_business_day(date(2024, 1, 12)), date(2024, 1, 15));
    assert_eq!(next_business_day(date(2024, 1, 13)), date(2024, 1, 15));
    assert_eq!(next_business_day(date(2024, 1, 15)), date(2024, 1, 16));
  }

  #[test]
  fn workday_of_date() {
    assert_eq!(Workday::of(date(2024, 1, 15)), Some(Workday::Monday));
    assert_eq!(Workday::of(date(2024, 1, 13)), None);
    assert!(Workday::from_number(6).is_err());
    assert_eq!(Workday::from_number(3).unwrap(), Workday::Wednesday);
  }

  #[test]
  fn workweeks_start_monday_and_hold_five_days() {
    // Start mid-week; the grid still begins at that week's Monday.
    let weeks = workweeks(date(2024, 1, 17), 4);
    assert_eq!(weeks.len(), 4);
    for week in &weeks {
      assert_eq!(week.len(), 5);
      assert_eq!(week[0].weekday(), Weekday::Mon);
      assert_eq!(week[4].weekday(), Weekday::Fri);
    }
    assert_eq!(weeks[0][0], date(2024, 1, 15));
    assert_eq!(weeks[1][0], date(2024, 1, 22));
  }

  #[test]
  fn dispatch_time_parses_all_forms() {
    for input in ["05:30:00", "05:30", "5:30 am", "5:30am", "5:30AM"] {
      assert_eq!(DispatchTime::parse(input).unwrap().storage(), "05:30:00");
    }
    assert_eq!(DispatchTime::parse("5:30pm").unwrap().storage(), "17:30:00");
    assert_eq!(DispatchTime::parse("12:15am").unwrap().storage(), "00:15:00");
    assert_eq!(DispatchTime::parse("12:15pm").unwrap().storage(), "12:15:00");
  }

  #[test]
  fn dispatch_time_display() {
    assert_eq!(DispatchTime::parse("05:30:00").unwrap().display(), "5:30am");
    assert_eq!(DispatchTime::parse("17:05:00").unwrap().display(), "5:05pm");
    assert_eq!(DispatchTime::parse("00:15:00").unwrap().display(), "12:15am");
    assert_eq!(DispatchTime::parse("12:00:00").unwrap().display(), "12:00pm");
  }

  #[test]
  fn dispatch_time_rejects_garbage() {
    for input in ["", "late", "25:00", "5:xx"] {
      assert!(DispatchTime::parse(input).is_err(), "accepted {input:?}");
    }
  }
}
