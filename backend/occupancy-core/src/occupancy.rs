// src/occupancy.rs

use serde::Serialize;

use crate::model::{Absence, Assignment, AssignmentStatus, PeriodRecord};
use crate::period::Period;

/// Hours booked by one consultant in one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancySnapshot {
    pub confirmed_hours: f64,
    pub tentative_hours: f64,
    pub absence_hours: f64,
    pub total_hours: f64,
}

/// Whether a record filed under `record` counts towards a query for `query`.
///
/// Weekly queries match exactly. Monthly queries also pick up every week
/// nested under the month, so per-week detail rolls up into the month total
/// on top of any records filed directly against the month.
pub fn in_period(record: &Period, query: &Period, is_weekly: bool) -> bool {
    if record == query {
        return true;
    }
    !is_weekly && record.is_week() && record.containing_month() == *query
}

/// Occupancy of `consultant_id` in `period`.
///
/// Never fails: an unknown consultant or an empty period gives a zero
/// snapshot. `tentative_hours` is always reported; it only enters
/// `total_hours` when `include_tentative` is set.
pub fn period_occupancy(
    consultant_id: &str,
    assignments: &[Assignment],
    absences: &[Absence],
    period: &Period,
    is_weekly: bool,
    include_tentative: bool,
) -> OccupancySnapshot {
    let mut confirmed_hours = 0.0;
    let mut tentative_hours = 0.0;
    for assignment in matching(assignments, consultant_id, period, is_weekly) {
        match assignment.status {
            AssignmentStatus::Confirmed => confirmed_hours += assignment.hours,
            AssignmentStatus::Tentative => tentative_hours += assignment.hours,
        }
    }

    let absence_hours: f64 = matching(absences, consultant_id, period, is_weekly)
        .map(PeriodRecord::hours)
        .sum();

    let total_hours =
        confirmed_hours + if include_tentative { tentative_hours } else { 0.0 } + absence_hours;

    OccupancySnapshot {
        confirmed_hours,
        tentative_hours,
        absence_hours,
        total_hours,
    }
}

fn matching<'a, R: PeriodRecord>(
    records: &'a [R],
    consultant_id: &'a str,
    period: &'a Period,
    is_weekly: bool,
) -> impl Iterator<Item = &'a R> + 'a {
    records.iter().filter(move |r| {
        r.consultant_id() == consultant_id && in_period(r.period(), period, is_weekly)
    })
}
