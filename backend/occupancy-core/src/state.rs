// src/state.rs
//
// The application state container. It is owned by the composition root and
// handed to the engine functions explicitly; nothing in the crate reaches for
// it as ambient state.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};

use crate::model::{
    new_record_id, Absence, AbsenceCategory, AppSettings, Assignment, AssignmentStatus, Consultant,
    Project, ProjectType, SettingsError,
};
use crate::period::Period;
use crate::planning::{self, CopySummary, ResetSummary};

pub const DEFAULT_STATE_FILE: &str = "occupancy_state.json";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("{kind} '{id}' not found")]
    RecordNotFound { kind: &'static str, id: String },
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub consultants: Vec<Consultant>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub absences: Vec<Absence>,
    #[serde(default)]
    pub settings: AppSettings,
}

/// Shared shape of the CRUD helpers below: every entity has a string id.
trait Keyed {
    const KIND: &'static str;
    fn key(&self) -> &str;
    fn key_mut(&mut self) -> &mut String;
}

macro_rules! keyed {
    ($ty:ty, $kind:literal) => {
        impl Keyed for $ty {
            const KIND: &'static str = $kind;
            fn key(&self) -> &str {
                &self.id
            }
            fn key_mut(&mut self) -> &mut String {
                &mut self.id
            }
        }
    };
}

keyed!(Consultant, "consultant");
keyed!(Project, "project");
keyed!(Assignment, "assignment");
keyed!(Absence, "absence");

fn insert<T: Keyed>(records: &mut Vec<T>, mut record: T) -> Result<String, StateError> {
    if record.key().is_empty() {
        *record.key_mut() = new_record_id();
    }
    let id = record.key().to_string();
    if records.iter().any(|r| r.key() == id) {
        return Err(StateError::DuplicateId { kind: T::KIND, id });
    }
    records.push(record);
    Ok(id)
}

fn replace<T: Keyed>(records: &mut [T], record: T) -> Result<(), StateError> {
    match records.iter_mut().find(|r| r.key() == record.key()) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => Err(StateError::RecordNotFound {
            kind: T::KIND,
            id: record.key().to_string(),
        }),
    }
}

fn delete<T: Keyed>(records: &mut Vec<T>, id: &str) -> Result<T, StateError> {
    match records.iter().position(|r| r.key() == id) {
        Some(index) => Ok(records.remove(index)),
        None => Err(StateError::RecordNotFound {
            kind: T::KIND,
            id: id.to_string(),
        }),
    }
}

impl AppState {
    // --- Consultants ---

    pub fn add_consultant(&mut self, consultant: Consultant) -> Result<String, StateError> {
        insert(&mut self.consultants, consultant)
    }

    pub fn update_consultant(&mut self, consultant: Consultant) -> Result<(), StateError> {
        replace(&mut self.consultants, consultant)
    }

    /// Assignments and absences keep their reference; they simply stop
    /// showing up in any roster view.
    pub fn remove_consultant(&mut self, id: &str) -> Result<Consultant, StateError> {
        delete(&mut self.consultants, id)
    }

    pub fn consultant(&self, id: &str) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.id == id)
    }

    // --- Projects ---

    pub fn add_project(&mut self, project: Project) -> Result<String, StateError> {
        insert(&mut self.projects, project)
    }

    pub fn update_project(&mut self, project: Project) -> Result<(), StateError> {
        replace(&mut self.projects, project)
    }

    pub fn remove_project(&mut self, id: &str) -> Result<Project, StateError> {
        delete(&mut self.projects, id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    // --- Assignments ---

    pub fn add_assignment(&mut self, assignment: Assignment) -> Result<String, StateError> {
        insert(&mut self.assignments, assignment)
    }

    pub fn update_assignment(&mut self, assignment: Assignment) -> Result<(), StateError> {
        replace(&mut self.assignments, assignment)
    }

    pub fn remove_assignment(&mut self, id: &str) -> Result<Assignment, StateError> {
        delete(&mut self.assignments, id)
    }

    // --- Absences ---

    pub fn add_absence(&mut self, absence: Absence) -> Result<String, StateError> {
        insert(&mut self.absences, absence)
    }

    pub fn update_absence(&mut self, absence: Absence) -> Result<(), StateError> {
        replace(&mut self.absences, absence)
    }

    pub fn remove_absence(&mut self, id: &str) -> Result<Absence, StateError> {
        delete(&mut self.absences, id)
    }

    // --- Period operations ---

    pub fn reset_period(&mut self, period: &Period, is_weekly: bool) -> ResetSummary {
        let summary = planning::reset_period(&mut self.assignments, &mut self.absences, period, is_weekly);
        info!(
            "Reset {} (weekly={}): removed {} assignments, {} absences",
            period, is_weekly, summary.assignments_removed, summary.absences_removed
        );
        summary
    }

    pub fn copy_period(&mut self, from: &Period, to: &Period, is_weekly: bool) -> CopySummary {
        let summary = planning::copy_period(&mut self.assignments, &mut self.absences, from, to, is_weekly);
        info!(
            "Copied {} -> {} (weekly={}): {} assignments, {} absences",
            from, to, is_weekly, summary.assignments_copied, summary.absences_copied
        );
        summary
    }

    // --- Settings ---

    pub fn save_settings(&mut self, settings: AppSettings) -> Result<(), StateError> {
        settings.validate()?;
        self.settings = settings;
        info!("Settings saved.");
        Ok(())
    }

    /// Replace the collections fetched from the remote list store. Absences
    /// and settings are local-only and stay as they are.
    pub fn load_remote_data(
        &mut self,
        consultants: Vec<Consultant>,
        projects: Vec<Project>,
        assignments: Vec<Assignment>,
    ) {
        info!(
            "Loaded remote data: {} consultants, {} projects, {} assignments",
            consultants.len(),
            projects.len(),
            assignments.len()
        );
        self.consultants = consultants;
        self.projects = projects;
        self.assignments = assignments;
    }

    // --- Snapshot persistence ---

    /// Load a snapshot written by [`AppState::save_snapshot`]. A missing file
    /// is not an error.
    pub fn load_snapshot(path: &Path) -> Result<Option<AppState>, StateError> {
        if !path.exists() {
            info!("State snapshot {} not found.", path.display());
            return Ok(None);
        }
        let json_string = fs::read_to_string(path)?;
        match serde_json::from_str::<AppState>(&json_string) {
            Ok(state) => {
                info!("State snapshot loaded from {}", path.display());
                Ok(Some(state))
            }
            Err(e) => {
                error!("Failed to parse state snapshot {}: {}", path.display(), e);
                Err(StateError::Json(e))
            }
        }
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), StateError> {
        let json_string = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?; // Overwrites existing file
        file.write_all(json_string.as_bytes())?;
        info!("State snapshot saved to {}", path.display());
        Ok(())
    }

    // --- Demo data ---

    /// January 2026 demo roster: one overbooked consultant, one under the
    /// availability threshold, one on long medical leave, the rest nominal.
    pub fn sample() -> Self {
        let consultant = |id: &str, name: &str, role: &str| Consultant {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@consulting.example", id),
            role: role.to_string(),
            active: true,
            notes: None,
            remote_id: None,
        };
        let project = |id: &str, name: &str, project_type: ProjectType, client: Option<&str>| Project {
            id: id.to_string(),
            name: name.to_string(),
            project_type,
            client: client.map(str::to_string),
            description: None,
            active: true,
            remote_id: None,
        };
        let january = Period::Month { year: 2026, month: 1 };
        let assignment = |id: &str, consultant: &str, project: &str, hours: f64, status: AssignmentStatus| Assignment {
            id: id.to_string(),
            consultant_id: consultant.to_string(),
            project_id: project.to_string(),
            hours,
            status,
            description: None,
            period: january,
            is_weekly: false,
            remote_id: None,
        };
        let absence = |id: &str, consultant: &str, category: AbsenceCategory, hours: f64| Absence {
            id: id.to_string(),
            consultant_id: consultant.to_string(),
            category,
            hours,
            period: january,
            is_weekly: false,
            notes: None,
            remote_id: None,
        };

        use AssignmentStatus::{Confirmed, Tentative};
        AppState {
            consultants: vec![
                consultant("c1", "Alejandro Garcia", "Senior Architect"),
                consultant("c2", "Maria Rodriguez", "Project Manager"),
                consultant("c3", "Javier Lopez", "Cloud Engineer"),
                consultant("c4", "Lucia Fernandez", "UX Designer"),
                consultant("c5", "David Martinez", "Full Stack Developer"),
                consultant("c6", "Elena Sanchez", "Data Scientist"),
                consultant("c8", "Carmen Ruiz", "Business Analyst"),
                consultant("c11", "Rafael Moreno", "Junior Consultant"),
            ],
            projects: vec![
                project("p1", "Core Banking Transformation", ProjectType::Client, Some("Banco Estelar")),
                project("p2", "E-commerce Expansion", ProjectType::Client, Some("Moda Global")),
                project("p3", "AI Forecast Tool", ProjectType::Internal, None),
                project("p5", "Insurance Presales", ProjectType::Internal, None),
                project("p6", "Security Audit", ProjectType::Client, Some("Logistica SA")),
            ],
            assignments: vec![
                assignment("a1", "c1", "p1", 140.0, Confirmed),
                assignment("a2", "c1", "p3", 40.0, Tentative),
                assignment("a3", "c11", "p5", 80.0, Confirmed),
                assignment("a4", "c2", "p1", 120.0, Confirmed),
                assignment("a5", "c2", "p2", 40.0, Confirmed),
                assignment("a6", "c3", "p1", 160.0, Confirmed),
                assignment("a7", "c4", "p2", 100.0, Confirmed),
                assignment("a8", "c5", "p2", 160.0, Confirmed),
                assignment("a9", "c6", "p6", 140.0, Confirmed),
            ],
            absences: vec![
                absence("ab1", "c4", AbsenceCategory::Vacation, 40.0),
                absence("ab2", "c8", AbsenceCategory::MedicalLeave, 160.0),
            ],
            settings: AppSettings::default(),
        }
    }
}
