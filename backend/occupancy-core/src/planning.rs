// src/planning.rs
//
// Bulk edits keyed by period. Both operations match `(period, is_weekly)`
// exactly: resetting a month leaves the records filed under its weeks alone,
// unlike the read-side roll-up in `occupancy`.

use serde::Serialize;

use crate::model::{Absence, Assignment, PeriodRecord};
use crate::period::Period;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub assignments_removed: usize,
    pub absences_removed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopySummary {
    pub assignments_copied: usize,
    pub absences_copied: usize,
}

/// Remove every record filed under `(period, is_weekly)` and hand them back,
/// in their original order.
pub fn take_period<R: PeriodRecord>(records: &mut Vec<R>, period: &Period, is_weekly: bool) -> Vec<R> {
    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        if record.filed_under(period, is_weekly) {
            removed.push(record);
        } else {
            kept.push(record);
        }
    }
    *records = kept;
    removed
}

/// Append a fresh-identity copy of every record filed under
/// `(from, is_weekly)`, re-filed under `to`. Returns the ids of the copies.
/// No deduplication against what already sits in `to`.
pub fn duplicate_period<R: PeriodRecord>(
    records: &mut Vec<R>,
    from: &Period,
    to: &Period,
    is_weekly: bool,
) -> Vec<String> {
    let copies: Vec<R> = records
        .iter()
        .filter(|r| r.filed_under(from, is_weekly))
        .map(|r| r.duplicate_into(*to))
        .collect();
    let ids = copies.iter().map(|r| r.id().to_string()).collect();
    records.extend(copies);
    ids
}

pub fn reset_period(
    assignments: &mut Vec<Assignment>,
    absences: &mut Vec<Absence>,
    period: &Period,
    is_weekly: bool,
) -> ResetSummary {
    ResetSummary {
        assignments_removed: take_period(assignments, period, is_weekly).len(),
        absences_removed: take_period(absences, period, is_weekly).len(),
    }
}

pub fn copy_period(
    assignments: &mut Vec<Assignment>,
    absences: &mut Vec<Absence>,
    from: &Period,
    to: &Period,
    is_weekly: bool,
) -> CopySummary {
    CopySummary {
        assignments_copied: duplicate_period(assignments, from, to, is_weekly).len(),
        absences_copied: duplicate_period(absences, from, to, is_weekly).len(),
    }
}
