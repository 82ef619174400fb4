// src/model.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::period::Period;

// --- Roster ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Item id in the external list store, if the record has been pushed there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectType {
    Client,
    Internal,
    Absence,
    Tentative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

// --- Planning records ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentStatus {
    Confirmed,
    Tentative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(default)]
    pub id: String,
    pub consultant_id: String,
    pub project_id: String,
    #[serde(default, deserialize_with = "lenient_hours")]
    pub hours: f64,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub period: Period,
    pub is_weekly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsenceCategory {
    Vacation,
    PublicHoliday,
    MedicalLeave,
    PersonalLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    #[serde(default)]
    pub id: String,
    pub consultant_id: String,
    pub category: AbsenceCategory,
    #[serde(default, deserialize_with = "lenient_hours")]
    pub hours: f64,
    pub period: Period,
    pub is_weekly: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
}

/// Behaviour shared by assignments and absences: both are hours booked
/// against a consultant for a period.
pub trait PeriodRecord: Clone {
    fn id(&self) -> &str;
    fn consultant_id(&self) -> &str;
    fn hours(&self) -> f64;
    fn period(&self) -> &Period;
    fn is_weekly(&self) -> bool;
    fn remote_id(&self) -> Option<&str>;

    /// Copy of this record under a new identity, filed under `period`.
    /// The copy has never been pushed anywhere, so it carries no remote id.
    fn duplicate_into(&self, period: Period) -> Self;

    /// Exact `(period, is_weekly)` match, used by reset and copy.
    fn filed_under(&self, period: &Period, is_weekly: bool) -> bool {
        self.period() == period && self.is_weekly() == is_weekly
    }
}

impl PeriodRecord for Assignment {
    fn id(&self) -> &str {
        &self.id
    }
    fn consultant_id(&self) -> &str {
        &self.consultant_id
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn period(&self) -> &Period {
        &self.period
    }
    fn is_weekly(&self) -> bool {
        self.is_weekly
    }
    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
    fn duplicate_into(&self, period: Period) -> Self {
        Assignment {
            id: new_record_id(),
            period,
            remote_id: None,
            ..self.clone()
        }
    }
}

impl PeriodRecord for Absence {
    fn id(&self) -> &str {
        &self.id
    }
    fn consultant_id(&self) -> &str {
        &self.consultant_id
    }
    fn hours(&self) -> f64 {
        self.hours
    }
    fn period(&self) -> &Period {
        &self.period
    }
    fn is_weekly(&self) -> bool {
        self.is_weekly
    }
    fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }
    fn duplicate_into(&self, period: Period) -> Self {
        Absence {
            id: new_record_id(),
            period,
            remote_id: None,
            ..self.clone()
        }
    }
}

pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// --- Settings ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultView {
    Monthly,
    Weekly,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("{field} must be a positive number of hours, got {value}")]
    NonPositiveCapacity { field: &'static str, value: f64 },
    #[error("{field} must be zero or a positive number of hours, got {value}")]
    InvalidThreshold { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub available_monthly_threshold: f64,
    pub available_weekly_threshold: f64,
    pub standard_monthly_capacity: f64,
    pub standard_weekly_capacity: f64,
    pub default_view: DefaultView,
    pub include_tentative_by_default: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            available_monthly_threshold: 120.0,
            available_weekly_threshold: 30.0,
            standard_monthly_capacity: 160.0,
            standard_weekly_capacity: 40.0,
            default_view: DefaultView::Monthly,
            include_tentative_by_default: true,
        }
    }
}

impl AppSettings {
    pub fn capacity(&self, is_weekly: bool) -> f64 {
        if is_weekly {
            self.standard_weekly_capacity
        } else {
            self.standard_monthly_capacity
        }
    }

    pub fn availability_threshold(&self, is_weekly: bool) -> f64 {
        if is_weekly {
            self.available_weekly_threshold
        } else {
            self.available_monthly_threshold
        }
    }

    /// Checked when settings are saved. The classifier never calls this and
    /// will happily divide by a zero capacity.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("standardMonthlyCapacity", self.standard_monthly_capacity),
            ("standardWeeklyCapacity", self.standard_weekly_capacity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::NonPositiveCapacity { field, value });
            }
        }
        for (field, value) in [
            ("availableMonthlyThreshold", self.available_monthly_threshold),
            ("availableWeeklyThreshold", self.available_weekly_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::InvalidThreshold { field, value });
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

// --- Boundary coercion ---

/// Hours as they arrive from storage: numbers, numeric strings, null or junk.
/// Anything that is not a finite, non-negative number becomes 0.
pub fn coerce_hours(value: &Value) -> f64 {
    let hours = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if hours.is_finite() && hours > 0.0 {
        hours
    } else {
        0.0
    }
}

fn lenient_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_hours(&value))
}
