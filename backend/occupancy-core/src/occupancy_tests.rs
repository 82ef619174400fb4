// src/occupancy_tests.rs

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::occupancy::*;
    use crate::period::Period;

    fn period(key: &str) -> Period {
        key.parse().unwrap()
    }

    // Helper function to create a test assignment
    fn assignment(consultant: &str, hours: f64, status: AssignmentStatus, key: &str) -> Assignment {
        let period = period(key);
        Assignment {
            id: new_record_id(),
            consultant_id: consultant.to_string(),
            project_id: "p1".to_string(),
            hours,
            status,
            description: None,
            period,
            is_weekly: period.is_week(),
            remote_id: None,
        }
    }

    fn absence(consultant: &str, hours: f64, key: &str) -> Absence {
        let period = period(key);
        Absence {
            id: new_record_id(),
            consultant_id: consultant.to_string(),
            category: AbsenceCategory::Vacation,
            hours,
            period,
            is_weekly: period.is_week(),
            notes: None,
            remote_id: None,
        }
    }

    #[test]
    fn in_period_weekly_matches_exactly() {
        let w1 = period("2026-01-W1");
        assert!(in_period(&w1, &w1, true));
        assert!(!in_period(&period("2026-01"), &w1, true));
        assert!(!in_period(&period("2026-01-W2"), &w1, true));
    }

    #[test]
    fn in_period_monthly_rolls_up_weeks_of_that_month_only() {
        let january = period("2026-01");
        assert!(in_period(&january, &january, false));
        assert!(in_period(&period("2026-01-W1"), &january, false));
        assert!(in_period(&period("2026-01-W6"), &january, false));
        assert!(!in_period(&period("2026-02-W1"), &january, false));
        assert!(!in_period(&period("2025-01-W1"), &january, false));
        assert!(!in_period(&period("2026-02"), &january, false));
    }

    #[test]
    fn in_period_month_key_never_matches_as_a_week() {
        // "2026-01" and "2026-01-W1" share a prefix; the tagged form keeps them apart
        assert!(!in_period(&period("2026-01-W10"), &period("2026-01-W1"), true));
    }

    #[test]
    fn scenario_tentative_included() {
        let assignments = vec![
            assignment("x", 140.0, AssignmentStatus::Confirmed, "2026-01"),
            assignment("x", 40.0, AssignmentStatus::Tentative, "2026-01"),
        ];
        let snapshot = period_occupancy("x", &assignments, &[], &period("2026-01"), false, true);
        assert_eq!(
            snapshot,
            OccupancySnapshot {
                confirmed_hours: 140.0,
                tentative_hours: 40.0,
                absence_hours: 0.0,
                total_hours: 180.0,
            }
        );
    }

    #[test]
    fn scenario_tentative_excluded_still_reports_tentative_hours() {
        let assignments = vec![
            assignment("x", 140.0, AssignmentStatus::Confirmed, "2026-01"),
            assignment("x", 40.0, AssignmentStatus::Tentative, "2026-01"),
        ];
        let snapshot = period_occupancy("x", &assignments, &[], &period("2026-01"), false, false);
        assert_eq!(snapshot.total_hours, 140.0);
        assert_eq!(snapshot.tentative_hours, 40.0);
    }

    #[test]
    fn scenario_absence_only() {
        let absences = vec![absence("y", 80.0, "2026-01")];
        let snapshot = period_occupancy("y", &[], &absences, &period("2026-01"), false, true);
        assert_eq!(snapshot.absence_hours, 80.0);
        assert_eq!(snapshot.total_hours, 80.0);
        assert_eq!(snapshot.confirmed_hours, 0.0);
    }

    #[test]
    fn scenario_weeks_roll_up_into_month() {
        let assignments = vec![
            assignment("z", 20.0, AssignmentStatus::Confirmed, "2026-01-W1"),
            assignment("z", 30.0, AssignmentStatus::Confirmed, "2026-01-W2"),
        ];
        let monthly = period_occupancy("z", &assignments, &[], &period("2026-01"), false, true);
        assert_eq!(monthly.total_hours, 50.0);
        let weekly = period_occupancy("z", &assignments, &[], &period("2026-01-W1"), true, true);
        assert_eq!(weekly.total_hours, 20.0);
    }

    #[test]
    fn monthly_total_adds_direct_month_records_and_all_weeks() {
        let assignments = vec![
            assignment("x", 100.0, AssignmentStatus::Confirmed, "2026-01"),
            assignment("x", 10.0, AssignmentStatus::Confirmed, "2026-01-W1"),
            assignment("x", 12.0, AssignmentStatus::Tentative, "2026-01-W3"),
            assignment("x", 999.0, AssignmentStatus::Confirmed, "2026-02-W1"),
        ];
        let absences = vec![absence("x", 8.0, "2026-01-W2"), absence("x", 16.0, "2026-01")];

        let snapshot = period_occupancy("x", &assignments, &absences, &period("2026-01"), false, true);
        assert_eq!(snapshot.confirmed_hours, 110.0);
        assert_eq!(snapshot.tentative_hours, 12.0);
        assert_eq!(snapshot.absence_hours, 24.0);
        assert_eq!(snapshot.total_hours, 146.0);
    }

    #[test]
    fn weekly_query_skips_month_filed_records() {
        let assignments = vec![assignment("x", 160.0, AssignmentStatus::Confirmed, "2026-01")];
        let absences = vec![absence("x", 40.0, "2026-01")];
        let snapshot = period_occupancy("x", &assignments, &absences, &period("2026-01-W1"), true, true);
        assert_eq!(snapshot, OccupancySnapshot::default());
    }

    #[test]
    fn tentative_toggle_differs_by_tentative_hours() {
        let assignments = vec![
            assignment("x", 32.5, AssignmentStatus::Confirmed, "2026-01-W2"),
            assignment("x", 7.5, AssignmentStatus::Tentative, "2026-01-W2"),
            assignment("x", 4.0, AssignmentStatus::Tentative, "2026-01"),
        ];
        let absences = vec![absence("x", 8.0, "2026-01-W2")];
        for (key, weekly) in [("2026-01", false), ("2026-01-W2", true)] {
            let with = period_occupancy("x", &assignments, &absences, &period(key), weekly, true);
            let without = period_occupancy("x", &assignments, &absences, &period(key), weekly, false);
            assert_eq!(without.total_hours, with.total_hours - with.tentative_hours);
        }
    }

    #[test]
    fn other_consultants_are_ignored() {
        let assignments = vec![assignment("someone-else", 40.0, AssignmentStatus::Confirmed, "2026-01")];
        let absences = vec![absence("someone-else", 8.0, "2026-01")];
        let snapshot = period_occupancy("x", &assignments, &absences, &period("2026-01"), false, true);
        assert_eq!(snapshot, OccupancySnapshot::default());
    }

    #[test]
    fn unknown_consultant_and_empty_inputs_give_zero() {
        let snapshot = period_occupancy("nobody", &[], &[], &period("2026-01"), false, true);
        assert_eq!(snapshot, OccupancySnapshot::default());
    }

    #[test]
    fn coerced_hours_contribute_zero() {
        let raw = r#"{
            "consultantId": "x", "projectId": "p1", "hours": "not a number",
            "status": "Confirmed", "period": "2026-01", "isWeekly": false
        }"#;
        let junk: Assignment = serde_json::from_str(raw).unwrap();
        let assignments = vec![junk, assignment("x", 10.0, AssignmentStatus::Confirmed, "2026-01")];
        let snapshot = period_occupancy("x", &assignments, &[], &period("2026-01"), false, true);
        assert_eq!(snapshot.total_hours, 10.0);
    }
}
