use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::model::attendance::employee_id_from_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, ToSchema)]
#[strum(ascii_case_insensitive)]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

// Roster files come from hand-edited sheets, so "active", "ACTIVE" and "Active" all count.
impl Serialize for EmployeeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EmployeeStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "employeeId": "1001",
        "name": "John Doe",
        "department": "Warehouse",
        "status": "Active"
    })
)]
pub struct Employee {
    #[serde(deserialize_with = "employee_id_from_json")]
    #[schema(example = "1001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[serde(default)]
    #[schema(example = "Warehouse")]
    pub department: String,

    #[schema(example = "Active", value_type = String)]
    pub status: EmployeeStatus,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Label shown in the employee picker.
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.employee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_is_case_insensitive() {
        let emp: Employee = serde_json::from_value(json!({
            "employeeId": 7,
            "name": "Ana",
            "department": "Ops",
            "status": "active"
        }))
        .unwrap();
        assert!(emp.is_active());
        assert_eq!(emp.employee_id, "7");
        assert_eq!(emp.label(), "Ana (7)");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let res: Result<Employee, _> = serde_json::from_value(json!({
            "employeeId": "7",
            "name": "Ana",
            "status": "on leave"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn status_serializes_capitalised() {
        assert_eq!(
            serde_json::to_value(EmployeeStatus::Inactive).unwrap(),
            json!("Inactive")
        );
    }
}
