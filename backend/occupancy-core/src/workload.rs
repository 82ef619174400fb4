// src/workload.rs
//
// FTE ratio and the three-way occupancy status.

use serde::Serialize;
use std::fmt;

use crate::model::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OccupancyStatus {
    Overloaded,
    Available,
    Nominal,
}

impl OccupancyStatus {
    /// Short badge text shown in tables.
    pub fn label(&self) -> &'static str {
        match self {
            OccupancyStatus::Overloaded => "Overloaded",
            OccupancyStatus::Available => "Available",
            OccupancyStatus::Nominal => "OK",
        }
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Plain `hours / capacity`. A zero capacity yields `inf` or `NaN`; callers
/// guard before display.
pub fn fte(hours: f64, capacity: f64) -> f64 {
    hours / capacity
}

/// Classify `total_hours` against the capacity and availability threshold
/// for the view granularity. Both comparisons are strict, so hitting the
/// capacity or the threshold exactly is Nominal. NaN also lands on Nominal.
pub fn occupancy_status(total_hours: f64, settings: &AppSettings, is_weekly: bool) -> OccupancyStatus {
    let capacity = settings.capacity(is_weekly);
    let threshold = settings.availability_threshold(is_weekly);

    if total_hours > capacity {
        OccupancyStatus::Overloaded
    } else if total_hours < threshold {
        OccupancyStatus::Available
    } else {
        OccupancyStatus::Nominal
    }
}
