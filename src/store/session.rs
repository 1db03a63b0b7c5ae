use serde::{Deserialize, Serialize};
use strum_macros::AsRefStr;

/// Where one session's clock-out flow stands for one employee on one day.
///
/// ```text
/// IDLE -> AWAITING_LOG          -> IDLE   (log submitted)
/// IDLE -> AWAITING_MANUAL_ENTRY -> IDLE   (manual entry submitted)
/// ```
///
/// Rejected actions leave the state as it was.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, AsRefStr)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockOutState {
    #[default]
    Idle,
    /// Clock-out time is held here until a daily log arrives.
    AwaitingLog {
        date: String,
        employee_id: String,
        clock_out: String,
    },
    /// The day has no clock-in; one must be backfilled.
    AwaitingManualEntry { date: String, employee_id: String },
}

impl ClockOutState {
    /// Wire name, e.g. `AWAITING_LOG`.
    pub fn name(&self) -> &str {
        self.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ClockOutState::Idle)
    }

    pub fn is_manual_entry_for(&self, date: &str, employee_id: &str) -> bool {
        matches!(
            self,
            ClockOutState::AwaitingManualEntry { date: d, employee_id: e }
                if d == date && e == employee_id
        )
    }

    pub fn pending_clock_out(&self) -> Option<&str> {
        match self {
            ClockOutState::AwaitingLog { clock_out, .. } => Some(clock_out),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_match_the_wire_form() {
        let state = ClockOutState::AwaitingManualEntry {
            date: "01/01/2030".into(),
            employee_id: "1001".into(),
        };
        assert_eq!(state.name(), "AWAITING_MANUAL_ENTRY");
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"state": "AWAITING_MANUAL_ENTRY", "date": "01/01/2030", "employee_id": "1001"})
        );
        assert_eq!(ClockOutState::Idle.name(), "IDLE");
    }

    #[test]
    fn manual_entry_matches_its_key_only() {
        let state = ClockOutState::AwaitingManualEntry {
            date: "01/01/2030".into(),
            employee_id: "1001".into(),
        };
        assert!(state.is_manual_entry_for("01/01/2030", "1001"));
        assert!(!state.is_manual_entry_for("02/01/2030", "1001"));
        assert!(!ClockOutState::Idle.is_manual_entry_for("01/01/2030", "1001"));
    }
}
