// src/remote.rs
//
// Seam to the external list store that mirrors assignments and absences.
// Local and remote writes are two separate steps with no transaction; the
// synced operations below mutate local state first, push to the store, and
// undo the local change if the store refuses.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::model::{new_record_id, Absence, Assignment, PeriodRecord};
use crate::period::Period;
use crate::planning::{duplicate_period, take_period, CopySummary, ResetSummary};
use crate::state::AppState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Remote store rejected {operation}: {message}")]
    Rejected { operation: &'static str, message: String },
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the record remotely and return its remote item id.
    async fn create_assignment(&self, assignment: &Assignment) -> Result<String, StoreError>;
    async fn delete_assignment(&self, remote_id: &str) -> Result<(), StoreError>;
    async fn create_absence(&self, absence: &Absence) -> Result<String, StoreError>;
    async fn delete_absence(&self, remote_id: &str) -> Result<(), StoreError>;
}

/// Reset a period locally, then delete the removed records that exist
/// remotely. If a remote delete fails the local lists are restored as they
/// were, order included; deletes that already went through are not undone
/// remotely.
pub async fn reset_period_synced(
    state: &mut AppState,
    store: &dyn RecordStore,
    period: &Period,
    is_weekly: bool,
) -> Result<ResetSummary, StoreError> {
    let saved_assignments = state.assignments.clone();
    let saved_absences = state.absences.clone();
    let removed_assignments = take_period(&mut state.assignments, period, is_weekly);
    let removed_absences = take_period(&mut state.absences, period, is_weekly);

    let mut pushed = 0usize;
    let outcome = async {
        for assignment in &removed_assignments {
            if let Some(remote_id) = assignment.remote_id() {
                store.delete_assignment(remote_id).await?;
                pushed += 1;
            }
        }
        for absence in &removed_absences {
            if let Some(remote_id) = absence.remote_id() {
                store.delete_absence(remote_id).await?;
                pushed += 1;
            }
        }
        Ok::<(), StoreError>(())
    }
    .await;

    match outcome {
        Ok(()) => {
            info!("Reset {} synced: {} remote deletes", period, pushed);
            Ok(ResetSummary {
                assignments_removed: removed_assignments.len(),
                absences_removed: removed_absences.len(),
            })
        }
        Err(e) => {
            error!("Remote reset of {} failed: {}. Restoring local records.", period, e);
            if pushed > 0 {
                warn!(
                    "{} records were already deleted remotely; local and remote state now differ.",
                    pushed
                );
            }
            state.assignments = saved_assignments;
            state.absences = saved_absences;
            Err(e)
        }
    }
}

/// Copy a period locally, then create every copy remotely and record the
/// returned remote ids. On failure the local copies are dropped again and
/// the copies already created remotely are deleted, best effort.
pub async fn copy_period_synced(
    state: &mut AppState,
    store: &dyn RecordStore,
    from: &Period,
    to: &Period,
    is_weekly: bool,
) -> Result<CopySummary, StoreError> {
    let assignment_ids = duplicate_period(&mut state.assignments, from, to, is_weekly);
    let absence_ids = duplicate_period(&mut state.absences, from, to, is_weekly);

    let outcome = async {
        for assignment in state
            .assignments
            .iter_mut()
            .filter(|a| assignment_ids.contains(&a.id))
        {
            let remote_id = store.create_assignment(assignment).await?;
            assignment.remote_id = Some(remote_id);
        }
        for absence in state
            .absences
            .iter_mut()
            .filter(|a| absence_ids.contains(&a.id))
        {
            let remote_id = store.create_absence(absence).await?;
            absence.remote_id = Some(remote_id);
        }
        Ok::<(), StoreError>(())
    }
    .await;

    match outcome {
        Ok(()) => {
            info!(
                "Copy {} -> {} synced: {} assignments, {} absences",
                from,
                to,
                assignment_ids.len(),
                absence_ids.len()
            );
            Ok(CopySummary {
                assignments_copied: assignment_ids.len(),
                absences_copied: absence_ids.len(),
            })
        }
        Err(e) => {
            error!("Remote copy {} -> {} failed: {}. Dropping local copies.", from, to, e);
            let created_assignments: Vec<String> = state
                .assignments
                .iter()
                .filter(|a| assignment_ids.contains(&a.id))
                .filter_map(|a| a.remote_id.clone())
                .collect();
            let created_absences: Vec<String> = state
                .absences
                .iter()
                .filter(|a| absence_ids.contains(&a.id))
                .filter_map(|a| a.remote_id.clone())
                .collect();

            let mut orphaned = 0usize;
            for remote_id in &created_assignments {
                if let Err(undo) = store.delete_assignment(remote_id).await {
                    warn!("Could not delete remote assignment {}: {}", remote_id, undo);
                    orphaned += 1;
                }
            }
            for remote_id in &created_absences {
                if let Err(undo) = store.delete_absence(remote_id).await {
                    warn!("Could not delete remote absence {}: {}", remote_id, undo);
                    orphaned += 1;
                }
            }
            if orphaned > 0 {
                warn!(
                    "{} copies remain in the remote store; local and remote state now differ.",
                    orphaned
                );
            }

            state.assignments.retain(|a| !assignment_ids.contains(&a.id));
            state.absences.retain(|a| !absence_ids.contains(&a.id));
            Err(e)
        }
    }
}

// --- In-process store ---

/// Record store kept in memory. The server never wires one in; it stands in
/// for the external store in tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    assignments: Mutex<HashMap<String, Assignment>>,
    absences: Mutex<HashMap<String, Absence>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn assignment_count(&self) -> usize {
        self.assignments.lock().await.len()
    }

    pub async fn absence_count(&self) -> usize {
        self.absences.lock().await.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_assignment(&self, assignment: &Assignment) -> Result<String, StoreError> {
        let remote_id = new_record_id();
        self.assignments
            .lock()
            .await
            .insert(remote_id.clone(), assignment.clone());
        Ok(remote_id)
    }

    async fn delete_assignment(&self, remote_id: &str) -> Result<(), StoreError> {
        match self.assignments.lock().await.remove(remote_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Rejected {
                operation: "delete_assignment",
                message: format!("item {} not found", remote_id),
            }),
        }
    }

    async fn create_absence(&self, absence: &Absence) -> Result<String, StoreError> {
        let remote_id = new_record_id();
        self.absences
            .lock()
            .await
            .insert(remote_id.clone(), absence.clone());
        Ok(remote_id)
    }

    async fn delete_absence(&self, remote_id: &str) -> Result<(), StoreError> {
        match self.absences.lock().await.remove(remote_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Rejected {
                operation: "delete_absence",
                message: format!("item {} not found", remote_id),
            }),
        }
    }
}
