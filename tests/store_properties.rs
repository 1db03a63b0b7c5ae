use std::collections::HashSet;

use proptest::prelude::*;

use timeclock::model::attendance::{MAX_LOG_CHARS, canonical_date, canonical_employee_id};
use timeclock::store::{AttendanceStore, ClockOutState, RecordEdit};

#[derive(Debug, Clone)]
enum Action {
    ClockIn { emp: usize, day: usize },
    ClockOut { emp: usize, day: usize },
    SubmitLog { log: String },
    ManualEntry { emp: usize, day: usize, log: String },
    Upsert { emp: usize, day: usize, clock_in: Option<String> },
    Delete { emp: usize, day: usize },
}

const EMPLOYEES: [&str; 3] = ["1001", "1002.0", " 1003 "];
const DAYS: [&str; 3] = ["01/01/2030", "1/1/2030", "02/01/2030"];

fn log() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-z ]{1,40}",
        Just("x".repeat(MAX_LOG_CHARS + 1)),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    let emp = 0..EMPLOYEES.len();
    let day = 0..DAYS.len();
    prop_oneof![
        (emp.clone(), day.clone()).prop_map(|(emp, day)| Action::ClockIn { emp, day }),
        (emp.clone(), day.clone()).prop_map(|(emp, day)| Action::ClockOut { emp, day }),
        log().prop_map(|log| Action::SubmitLog { log }),
        (emp.clone(), day.clone(), log())
            .prop_map(|(emp, day, log)| Action::ManualEntry { emp, day, log }),
        (
            emp.clone(),
            day.clone(),
            prop::option::of(prop_oneof![Just("08:00".to_string()), Just("25:00".to_string())])
        )
            .prop_map(|(emp, day, clock_in)| Action::Upsert { emp, day, clock_in }),
        (emp, day).prop_map(|(emp, day)| Action::Delete { emp, day }),
    ]
}

/// Applies one action the way the service does, carrying the pending state.
fn apply(store: &mut AttendanceStore, state: &mut ClockOutState, action: &Action) -> bool {
    let result = match action {
        Action::ClockIn { emp, day } => store
            .clock_in(EMPLOYEES[*emp], DAYS[*day], "08:00:00")
            .map(|_| ()),
        Action::ClockOut { emp, day } => store
            .clock_out(EMPLOYEES[*emp], DAYS[*day], "17:00:00")
            .map(|next| *state = next),
        Action::SubmitLog { log } => store.submit_log(state, log).map(|next| *state = next),
        Action::ManualEntry { emp, day, log } => store
            .submit_manual_entry(EMPLOYEES[*emp], DAYS[*day], "07:30", "17:00:00", log)
            .map(|_| ()),
        Action::Upsert { emp, day, clock_in } => store
            .admin_upsert(
                DAYS[*day],
                EMPLOYEES[*emp],
                RecordEdit {
                    clock_in: clock_in.as_deref(),
                    ..RecordEdit::default()
                },
            )
            .map(|_| ()),
        Action::Delete { emp, day } => store
            .admin_delete(DAYS[*day], EMPLOYEES[*emp])
            .map(|_| ()),
    };
    result.is_ok()
}

proptest! {
    #[test]
    fn one_record_per_employee_per_day(actions in prop::collection::vec(action(), 0..40)) {
        let mut store = AttendanceStore::default();
        let mut state = ClockOutState::Idle;
        for action in &actions {
            apply(&mut store, &mut state, action);

            let mut seen = HashSet::new();
            for rec in store.records() {
                let key = (canonical_date(&rec.date), canonical_employee_id(&rec.employee_id));
                prop_assert!(seen.insert(key), "duplicate key after {:?}", action);
            }
        }
    }

    #[test]
    fn rejected_actions_change_nothing(actions in prop::collection::vec(action(), 0..40)) {
        let mut store = AttendanceStore::default();
        let mut state = ClockOutState::Idle;
        for action in &actions {
            let before = store.records().to_vec();
            let before_state = state.clone();
            if !apply(&mut store, &mut state, action) {
                prop_assert_eq!(store.records(), before.as_slice());
                prop_assert_eq!(&state, &before_state);
            }
        }
    }

    #[test]
    fn stored_logs_are_trimmed_and_bounded(actions in prop::collection::vec(action(), 0..40)) {
        let mut store = AttendanceStore::default();
        let mut state = ClockOutState::Idle;
        for action in &actions {
            apply(&mut store, &mut state, action);
        }
        for rec in store.records() {
            if let Some(log) = &rec.daily_log {
                prop_assert!(!log.is_empty());
                prop_assert_eq!(log.trim(), log.as_str());
                prop_assert!(log.chars().count() <= MAX_LOG_CHARS);
            }
        }
    }

    #[test]
    fn completed_days_reject_clocking(emp in 0..EMPLOYEES.len(), log in "[a-z]{1,20}") {
        let mut store = AttendanceStore::default();
        store.clock_in(EMPLOYEES[emp], DAYS[0], "08:00:00").unwrap();
        let pending = store.clock_out(EMPLOYEES[emp], DAYS[0], "17:00:00").unwrap();
        store.submit_log(&pending, &log).unwrap();
        let done = store.records().to_vec();

        prop_assert!(store.clock_in(EMPLOYEES[emp], DAYS[0], "09:00:00").is_err());
        prop_assert!(store.clock_out(EMPLOYEES[emp], DAYS[0], "18:00:00").is_err());
        prop_assert_eq!(store.records(), done.as_slice());
    }
}
