// src/period.rs
//
// Period identifiers: a calendar month, or the n-th week inside a month.
// Keys are `YYYY-MM` and `YYYY-MM-W<n>`; the string form only exists at the
// serialization boundary.

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    #[error("invalid period key '{0}': expected YYYY-MM or YYYY-MM-W<n>")]
    Malformed(String),
    #[error("month {0} is out of range (1-12)")]
    MonthOutOfRange(u32),
    #[error("week number must start at 1")]
    ZeroWeek,
    #[error("year {0} does not fit a four-digit period key")]
    YearOutOfRange(i32),
}

/// Years a period key can carry: the key format is fixed at four digits.
pub const KEY_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

fn check_year(year: i32) -> Result<(), PeriodParseError> {
    if KEY_YEARS.contains(&year) {
        Ok(())
    } else {
        Err(PeriodParseError::YearOutOfRange(year))
    }
}

/// A month, or a week nested under a month.
///
/// Weeks are numbered inside their month (W1 is the week holding the 1st,
/// weeks start on Monday), so the same physical week can be the last week of
/// one month and W1 of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Month { year: i32, month: u32 },
    Week { year: i32, month: u32, week: u32 },
}

/// The `{id, label, monthId}` triple handed to views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub id: String,
    pub label: String,
    pub month_id: String,
}

impl Period {
    pub fn month(year: i32, month: u32) -> Result<Self, PeriodParseError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::MonthOutOfRange(month));
        }
        Ok(Period::Month { year, month })
    }

    pub fn week(year: i32, month: u32, week: u32) -> Result<Self, PeriodParseError> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::MonthOutOfRange(month));
        }
        if week == 0 {
            return Err(PeriodParseError::ZeroWeek);
        }
        Ok(Period::Week { year, month, week })
    }

    /// Period holding `date`. In weekly mode an explicit `week` wins over the
    /// one derived from the date.
    ///
    /// Unchecked: a date outside [`KEY_YEARS`] or an explicit week 0 gives a
    /// period whose key does not parse back. Use [`Period::try_from_date`]
    /// for input that has not been validated.
    pub fn from_date(date: NaiveDate, is_weekly: bool, week: Option<u32>) -> Self {
        let year = date.year();
        let month = date.month();
        if is_weekly {
            let week = week.unwrap_or_else(|| week_of_month(date));
            Period::Week { year, month, week }
        } else {
            Period::Month { year, month }
        }
    }

    /// Checked [`Period::from_date`].
    pub fn try_from_date(date: NaiveDate, is_weekly: bool, week: Option<u32>) -> Result<Self, PeriodParseError> {
        if is_weekly {
            let week = week.unwrap_or_else(|| week_of_month(date));
            Period::week(date.year(), date.month(), week)
        } else {
            Period::month(date.year(), date.month())
        }
    }

    pub fn year(&self) -> i32 {
        match *self {
            Period::Month { year, .. } | Period::Week { year, .. } => year,
        }
    }

    pub fn month_number(&self) -> u32 {
        match *self {
            Period::Month { month, .. } | Period::Week { month, .. } => month,
        }
    }

    pub fn week_number(&self) -> Option<u32> {
        match *self {
            Period::Month { .. } => None,
            Period::Week { week, .. } => Some(week),
        }
    }

    pub fn is_week(&self) -> bool {
        matches!(self, Period::Week { .. })
    }

    pub fn containing_month(&self) -> Period {
        Period::Month {
            year: self.year(),
            month: self.month_number(),
        }
    }

    /// The containing month moved by `delta` months. Weeks lose their week
    /// number, since week numbering is per month.
    pub fn offset_months(&self, delta: i32) -> Period {
        let index = self.year() * 12 + self.month_number() as i32 - 1 + delta;
        Period::Month {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn key(&self) -> String {
        self.to_string()
    }

    /// English month name; "Unknown" for a hand-built period with a month
    /// outside 1-12.
    pub fn month_name(&self) -> &'static str {
        (self.month_number() as usize)
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index))
            .copied()
            .unwrap_or("Unknown")
    }

    pub fn label(&self) -> String {
        match *self {
            Period::Month { year, .. } => format!("{} {}", self.month_name(), year),
            Period::Week { week, .. } => format!("{} - Week {}", self.month_name(), week),
        }
    }

    pub fn info(&self) -> PeriodInfo {
        PeriodInfo {
            id: self.key(),
            label: self.label(),
            month_id: self.containing_month().key(),
        }
    }
}

/// Week of the month for `date`: `ceil((day + offset - 1) / 7)` where
/// `offset` is the ISO weekday (Mon=1..Sun=7) of the 1st. Not clamped, so a
/// long month starting late in the week reaches W6.
pub fn week_of_month(date: NaiveDate) -> u32 {
    let offset = date.with_day(1).unwrap_or(date).weekday().number_from_monday();
    (date.day() + offset - 1).div_ceil(7)
}

/// Unchecked like [`Period::from_date`]; keys only round-trip for years in [`KEY_YEARS`].
pub fn format_period(date: NaiveDate, is_weekly: bool, week: Option<u32>) -> PeriodInfo {
    Period::from_date(date, is_weekly, week).info()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Period::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            Period::Week { year, month, week } => write!(f, "{:04}-{:02}-W{}", year, month, week),
        }
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PeriodParseError::Malformed(s.to_string());
        let (month_part, week_part) = match s.split_once("-W") {
            Some((m, w)) => (m, Some(w)),
            None => (s, None),
        };

        // YYYY-MM, digits only, fixed width
        let (year_str, month_str) = month_part.split_once('-').ok_or_else(malformed)?;
        if year_str.len() != 4
            || month_str.len() != 2
            || !year_str.bytes().all(|b| b.is_ascii_digit())
            || !month_str.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }
        let year: i32 = year_str.parse().map_err(|_| malformed())?;
        let month: u32 = month_str.parse().map_err(|_| malformed())?;

        match week_part {
            None => Period::month(year, month),
            Some(w) => {
                if w.is_empty() || !w.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(malformed());
                }
                let week: u32 = w.parse().map_err(|_| malformed())?;
                Period::week(year, month, week)
            }
        }
    }
}

impl Serialize for Period {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(de::Error::custom)
    }
}
