// src/lib.rs
//
// Consultant occupancy engine: period keys, per-period aggregation, FTE and
// status classification, bulk period edits, and the HTTP API on top.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod insights;
pub mod model;
pub mod occupancy;
pub mod period;
pub mod planning;
pub mod remote;
pub mod state;
pub mod workload;

#[cfg(test)]
mod export_tests;
#[cfg(test)]
mod occupancy_tests;
#[cfg(test)]
mod state_tests;
