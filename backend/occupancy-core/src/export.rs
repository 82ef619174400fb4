// src/export.rs

use std::io::Write;
use thiserror::Error;

use crate::model::AssignmentStatus;
use crate::period::Period;
use crate::state::AppState;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn planning_file_name(period: &Period) -> String {
    format!("planning_{}.csv", period)
}

fn status_text(status: AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Confirmed => "Confirmed",
        AssignmentStatus::Tentative => "Tentative",
    }
}

/// Write the planning sheet for `period`: one row per assignment filed under
/// exactly that period, with consultant and project names resolved. Unknown
/// references export as empty cells. Returns the number of rows written.
pub fn write_planning_csv<W: Write>(writer: W, state: &AppState, period: &Period) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Consultant", "Project", "Hours", "Status", "Description"])?;

    let mut rows = 0;
    for assignment in state.assignments.iter().filter(|a| a.period == *period) {
        let consultant = state
            .consultant(&assignment.consultant_id)
            .map(|c| c.name.as_str())
            .unwrap_or("");
        let project = state
            .project(&assignment.project_id)
            .map(|p| p.name.as_str())
            .unwrap_or("");
        let hours = assignment.hours.to_string();
        wtr.write_record([
            consultant,
            project,
            hours.as_str(),
            status_text(assignment.status),
            assignment.description.as_deref().unwrap_or(""),
        ])?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}

pub fn planning_csv(state: &AppState, period: &Period) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_planning_csv(&mut buffer, state, period)?;
    Ok(String::from_utf8(buffer)?)
}
