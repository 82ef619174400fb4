// src/dashboard.rs
//
// Team-level views built on the occupancy engine: per-consultant rows,
// aggregate statistics and the short trend series behind the charts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::Consultant;
use crate::occupancy::{period_occupancy, OccupancySnapshot};
use crate::period::{Period, PeriodInfo};
use crate::state::AppState;
use crate::workload::{fte, occupancy_status, OccupancyStatus};

/// Weekly trend covers W1..=W5 of the anchor month.
const TREND_WEEKS: std::ops::RangeInclusive<u32> = 1..=5;
/// Monthly trend covers two months back to three months ahead.
const TREND_MONTH_OFFSETS: std::ops::RangeInclusive<i32> = -2..=3;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultantFilter {
    pub search: String,
    pub only_overloaded: bool,
    pub only_available: bool,
}

impl ConsultantFilter {
    fn matches(&self, consultant: &Consultant, status: OccupancyStatus) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = needle.is_empty()
            || consultant.name.to_lowercase().contains(&needle)
            || consultant.role.to_lowercase().contains(&needle);
        let matches_overload = !self.only_overloaded || status == OccupancyStatus::Overloaded;
        let matches_available = !self.only_available || status == OccupancyStatus::Available;
        matches_search && matches_overload && matches_available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantOccupancy {
    pub consultant_id: String,
    pub name: String,
    pub role: String,
    #[serde(flatten)]
    pub snapshot: OccupancySnapshot,
    pub fte: f64,
    pub status: OccupancyStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStats {
    /// Confirmed plus absence hours; tentative hours are reported apart.
    pub total_hours: f64,
    pub total_tentative: f64,
    pub overloaded_count: usize,
    pub available_count: usize,
    pub total_fte: f64,
    pub occupancy_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamOverview {
    pub period: PeriodInfo,
    pub is_weekly: bool,
    pub include_tentative: bool,
    pub rows: Vec<ConsultantOccupancy>,
    pub stats: TeamStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: PeriodInfo,
    pub label: String,
    pub team_average: f64,
    pub consultants: BTreeMap<String, f64>,
}

/// Display-side guard for ratios that may have divided by zero.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

pub fn consultant_occupancy(
    state: &AppState,
    consultant: &Consultant,
    period: &Period,
    is_weekly: bool,
    include_tentative: bool,
) -> ConsultantOccupancy {
    let snapshot = period_occupancy(
        &consultant.id,
        &state.assignments,
        &state.absences,
        period,
        is_weekly,
        include_tentative,
    );
    ConsultantOccupancy {
        consultant_id: consultant.id.clone(),
        name: consultant.name.clone(),
        role: consultant.role.clone(),
        snapshot,
        fte: fte(snapshot.total_hours, state.settings.capacity(is_weekly)),
        status: occupancy_status(snapshot.total_hours, &state.settings, is_weekly),
    }
}

pub fn team_overview(
    state: &AppState,
    period: &Period,
    is_weekly: bool,
    include_tentative: bool,
    filter: &ConsultantFilter,
) -> TeamOverview {
    let rows: Vec<ConsultantOccupancy> = state
        .consultants
        .iter()
        .map(|c| (c, consultant_occupancy(state, c, period, is_weekly, include_tentative)))
        .filter(|(c, row)| filter.matches(c, row.status))
        .map(|(_, row)| row)
        .collect();

    let stats = team_stats(&rows, state.settings.capacity(is_weekly), include_tentative);

    TeamOverview {
        period: period.info(),
        is_weekly,
        include_tentative,
        rows,
        stats,
    }
}

pub fn team_stats(rows: &[ConsultantOccupancy], capacity: f64, include_tentative: bool) -> TeamStats {
    let mut stats = TeamStats::default();
    for row in rows {
        stats.total_hours += row.snapshot.confirmed_hours + row.snapshot.absence_hours;
        stats.total_tentative += row.snapshot.tentative_hours;
        match row.status {
            OccupancyStatus::Overloaded => stats.overloaded_count += 1,
            OccupancyStatus::Available => stats.available_count += 1,
            OccupancyStatus::Nominal => {}
        }
    }

    let fte_hours = stats.total_hours + if include_tentative { stats.total_tentative } else { 0.0 };
    stats.total_fte = finite_or_zero(fte(fte_hours, capacity));
    stats.occupancy_pct = finite_or_zero(stats.total_hours / (rows.len() as f64 * capacity) * 100.0);
    stats
}

/// Total hours per period around `anchor`, for the whole team (average) and
/// for each consultant in `selected`. Unknown ids in `selected` are skipped.
pub fn trend_series(
    state: &AppState,
    anchor: NaiveDate,
    is_weekly: bool,
    include_tentative: bool,
    selected: &[String],
) -> Vec<TrendPoint> {
    let points: Vec<(Period, String)> = if is_weekly {
        TREND_WEEKS
            .map(|w| (Period::from_date(anchor, true, Some(w)), format!("Week {}", w)))
            .collect()
    } else {
        let anchor_month = Period::from_date(anchor, false, None);
        TREND_MONTH_OFFSETS
            .map(|delta| {
                let period = anchor_month.offset_months(delta);
                let label = period.month_name().to_string();
                (period, label)
            })
            .collect()
    };

    let total_for = |consultant_id: &str, period: &Period| {
        period_occupancy(
            consultant_id,
            &state.assignments,
            &state.absences,
            period,
            is_weekly,
            include_tentative,
        )
        .total_hours
    };

    points
        .into_iter()
        .map(|(period, label)| {
            let team_total: f64 = state
                .consultants
                .iter()
                .map(|c| total_for(&c.id, &period))
                .sum();
            let team_average = finite_or_zero(team_total / state.consultants.len() as f64);

            let consultants = selected
                .iter()
                .filter_map(|id| state.consultant(id))
                .map(|c| (c.name.clone(), total_for(&c.id, &period)))
                .collect();

            TrendPoint {
                period: period.info(),
                label,
                team_average,
                consultants,
            }
        })
        .collect()
}
