// src/export_tests.rs

#[cfg(test)]
mod tests {
    use crate::export::*;
    use crate::model::*;
    use crate::period::Period;
    use crate::state::AppState;

    const JANUARY: Period = Period::Month { year: 2026, month: 1 };

    fn extra_assignment(id: &str, consultant: &str, hours: f64, period: Period, description: Option<&str>) -> Assignment {
        Assignment {
            id: id.to_string(),
            consultant_id: consultant.to_string(),
            project_id: "p2".to_string(),
            hours,
            status: AssignmentStatus::Tentative,
            description: description.map(str::to_string),
            period,
            is_weekly: period.is_week(),
            remote_id: None,
        }
    }

    #[test]
    fn file_name_uses_period_key() {
        assert_eq!(planning_file_name(&JANUARY), "planning_2026-01.csv");
        assert_eq!(
            planning_file_name(&Period::Week { year: 2026, month: 1, week: 3 }),
            "planning_2026-01-W3.csv"
        );
    }

    #[test]
    fn sample_january_sheet() {
        let csv = planning_csv(&AppState::sample(), &JANUARY).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Consultant,Project,Hours,Status,Description");
        assert_eq!(lines[1], "Alejandro Garcia,Core Banking Transformation,140,Confirmed,");
        assert_eq!(lines[2], "Alejandro Garcia,AI Forecast Tool,40,Tentative,");
        assert_eq!(lines[3], "Rafael Moreno,Insurance Presales,80,Confirmed,");
    }

    #[test]
    fn only_exact_period_rows_are_exported() {
        let mut state = AppState::sample();
        let week = Period::Week { year: 2026, month: 1, week: 2 };
        state
            .add_assignment(extra_assignment("w1", "c2", 12.5, week, None))
            .unwrap();

        let mut monthly = Vec::new();
        assert_eq!(write_planning_csv(&mut monthly, &state, &JANUARY).unwrap(), 9);

        let weekly = planning_csv(&state, &week).unwrap();
        let lines: Vec<&str> = weekly.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Maria Rodriguez,E-commerce Expansion,12.5,Tentative,");
    }

    #[test]
    fn unknown_references_and_quoting() {
        let mut state = AppState::default();
        state
            .add_assignment(extra_assignment("x1", "ghost", 8.0, JANUARY, Some("Kickoff, then review")))
            .unwrap();
        let csv = planning_csv(&state, &JANUARY).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], ",,8,Tentative,\"Kickoff, then review\"");
    }

    #[test]
    fn empty_period_has_header_only() {
        let mut buffer = Vec::new();
        let rows = write_planning_csv(&mut buffer, &AppState::sample(), &Period::Month { year: 2027, month: 5 }).unwrap();
        assert_eq!(rows, 0);
        assert_eq!(String::from_utf8(buffer).unwrap(), "Consultant,Project,Hours,Status,Description\n");
    }
}
