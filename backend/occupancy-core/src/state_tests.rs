// src/state_tests.rs

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::period::Period;
    use crate::state::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_snapshot_path() -> PathBuf {
        std::env::temp_dir().join(format!("occupancy_state_{}.json", new_record_id()))
    }

    fn consultant(id: &str, name: &str) -> Consultant {
        Consultant {
            id: id.to_string(),
            name: name.to_string(),
            email: String::new(),
            role: "Engineer".to_string(),
            active: true,
            notes: None,
            remote_id: None,
        }
    }

    fn january_assignment(id: &str) -> Assignment {
        Assignment {
            id: id.to_string(),
            consultant_id: "c1".to_string(),
            project_id: "p1".to_string(),
            hours: 20.0,
            status: AssignmentStatus::Confirmed,
            description: None,
            period: Period::Month { year: 2026, month: 1 },
            is_weekly: false,
            remote_id: None,
        }
    }

    #[test]
    fn add_generates_id_when_missing() {
        let mut state = AppState::default();
        let id = state.add_consultant(consultant("", "Ana")).unwrap();
        assert!(!id.is_empty());
        assert_eq!(state.consultant(&id).map(|c| c.name.as_str()), Some("Ana"));
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut state = AppState::default();
        state.add_consultant(consultant("c1", "Ana")).unwrap();
        let err = state.add_consultant(consultant("c1", "Other")).unwrap_err();
        assert!(matches!(err, StateError::DuplicateId { kind: "consultant", ref id } if id == "c1"));
        assert_eq!(state.consultants.len(), 1);
    }

    #[test]
    fn update_replaces_existing_record() {
        let mut state = AppState::default();
        state.add_consultant(consultant("c1", "Ana")).unwrap();
        state.update_consultant(consultant("c1", "Ana Maria")).unwrap();
        assert_eq!(state.consultant("c1").unwrap().name, "Ana Maria");
    }

    #[test]
    fn update_and_remove_unknown_id_fail() {
        let mut state = AppState::default();
        assert!(matches!(
            state.update_consultant(consultant("ghost", "Nobody")),
            Err(StateError::RecordNotFound { kind: "consultant", .. })
        ));
        assert!(matches!(
            state.remove_project("ghost"),
            Err(StateError::RecordNotFound { kind: "project", .. })
        ));
        assert!(matches!(
            state.remove_absence("ghost"),
            Err(StateError::RecordNotFound { kind: "absence", .. })
        ));
    }

    #[test]
    fn remove_consultant_keeps_their_assignments() {
        let mut state = AppState::sample();
        let removed = state.remove_consultant("c1").unwrap();
        assert_eq!(removed.id, "c1");
        assert!(state.consultant("c1").is_none());
        assert!(state.assignments.iter().any(|a| a.consultant_id == "c1"));
    }

    #[test]
    fn assignment_crud_round() {
        let mut state = AppState::default();
        state.add_assignment(january_assignment("a1")).unwrap();
        let mut changed = january_assignment("a1");
        changed.hours = 32.0;
        state.update_assignment(changed).unwrap();
        assert_eq!(state.assignments[0].hours, 32.0);
        let removed = state.remove_assignment("a1").unwrap();
        assert_eq!(removed.hours, 32.0);
        assert!(state.assignments.is_empty());
    }

    #[test]
    fn save_settings_validates_before_storing() {
        let mut state = AppState::default();
        let bad = AppSettings {
            standard_monthly_capacity: 0.0,
            ..AppSettings::default()
        };
        assert!(matches!(
            state.save_settings(bad),
            Err(StateError::InvalidSettings(SettingsError::NonPositiveCapacity {
                field: "standardMonthlyCapacity",
                ..
            }))
        ));
        assert_eq!(state.settings, AppSettings::default());

        let good = AppSettings {
            standard_weekly_capacity: 32.0,
            default_view: DefaultView::Weekly,
            ..AppSettings::default()
        };
        state.save_settings(good.clone()).unwrap();
        assert_eq!(state.settings, good);
    }

    #[test]
    fn settings_validation_rules() {
        assert!(AppSettings::default().validate().is_ok());
        let negative_threshold = AppSettings {
            available_weekly_threshold: -1.0,
            ..AppSettings::default()
        };
        assert!(matches!(
            negative_threshold.validate(),
            Err(SettingsError::InvalidThreshold {
                field: "availableWeeklyThreshold",
                ..
            })
        ));
        let nan_capacity = AppSettings {
            standard_weekly_capacity: f64::NAN,
            ..AppSettings::default()
        };
        assert!(nan_capacity.validate().is_err());
        let zero_threshold = AppSettings {
            available_monthly_threshold: 0.0,
            ..AppSettings::default()
        };
        assert!(zero_threshold.validate().is_ok());
    }

    #[test]
    fn state_reset_and_copy_delegate_to_planning() {
        let mut state = AppState::sample();
        let january = Period::Month { year: 2026, month: 1 };
        let february = Period::Month { year: 2026, month: 2 };

        let copied = state.copy_period(&january, &february, false);
        assert_eq!(copied.assignments_copied, 9);
        assert_eq!(copied.absences_copied, 2);

        let reset = state.reset_period(&january, false);
        assert_eq!(reset.assignments_removed, 9);
        assert_eq!(reset.absences_removed, 2);
        assert!(state.assignments.iter().all(|a| a.period == february));
    }

    #[test]
    fn load_remote_data_keeps_absences_and_settings() {
        let mut state = AppState::sample();
        state.settings.standard_monthly_capacity = 150.0;
        state.load_remote_data(vec![consultant("r1", "Remote")], Vec::new(), vec![january_assignment("ra1")]);
        assert_eq!(state.consultants.len(), 1);
        assert!(state.projects.is_empty());
        assert_eq!(state.assignments.len(), 1);
        assert_eq!(state.absences.len(), 2);
        assert_eq!(state.settings.standard_monthly_capacity, 150.0);
    }

    #[test]
    fn snapshot_round_trip_on_disk() {
        let path = temp_snapshot_path();
        let state = AppState::sample();
        state.save_snapshot(&path).unwrap();
        let loaded = AppState::load_snapshot(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded, Some(state));
    }

    #[test]
    fn missing_snapshot_is_none() {
        let path = temp_snapshot_path();
        assert!(matches!(AppState::load_snapshot(&path), Ok(None)));
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let path = temp_snapshot_path();
        fs::write(&path, "{ not json").unwrap();
        let result = AppState::load_snapshot(&path);
        fs::remove_file(&path).ok();
        assert!(matches!(result, Err(StateError::Json(_))));
    }

    #[test]
    fn snapshot_tolerates_missing_sections_and_junk_hours() {
        let path = temp_snapshot_path();
        fs::write(
            &path,
            r#"{
                "assignments": [
                    {"id": "a1", "consultantId": "c1", "projectId": "p1", "hours": "12.5",
                     "status": "Tentative", "period": "2026-01-W2", "isWeekly": true},
                    {"id": "a2", "consultantId": "c1", "projectId": "p1", "hours": -4,
                     "status": "Confirmed", "period": "2026-01", "isWeekly": false},
                    {"id": "a3", "consultantId": "c1", "projectId": "p1", "hours": null,
                     "status": "Confirmed", "period": "2026-01", "isWeekly": false}
                ]
            }"#,
        )
        .unwrap();
        let loaded = AppState::load_snapshot(&path).unwrap().unwrap();
        fs::remove_file(&path).ok();

        assert!(loaded.consultants.is_empty());
        assert_eq!(loaded.settings, AppSettings::default());
        let hours: Vec<f64> = loaded.assignments.iter().map(|a| a.hours).collect();
        assert_eq!(hours, vec![12.5, 0.0, 0.0]);
        assert_eq!(
            loaded.assignments[0].period,
            Period::Week {
                year: 2026,
                month: 1,
                week: 2
            }
        );
    }

    #[test]
    fn sample_roster_shape() {
        let state = AppState::sample();
        assert_eq!(state.consultants.len(), 8);
        assert_eq!(state.projects.len(), 5);
        assert_eq!(state.assignments.len(), 9);
        assert_eq!(state.absences.len(), 2);
        assert!(state.settings.validate().is_ok());
    }

    #[test]
    fn coerce_hours_rules() {
        use serde_json::json;
        assert_eq!(coerce_hours(&json!(8)), 8.0);
        assert_eq!(coerce_hours(&json!(" 7.5 ")), 7.5);
        assert_eq!(coerce_hours(&json!("abc")), 0.0);
        assert_eq!(coerce_hours(&json!("NaN")), 0.0);
        assert_eq!(coerce_hours(&json!("inf")), 0.0);
        assert_eq!(coerce_hours(&json!(-3)), 0.0);
        assert_eq!(coerce_hours(&json!(true)), 0.0);
        assert_eq!(coerce_hours(&json!(null)), 0.0);
    }
}
