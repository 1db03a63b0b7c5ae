use std::sync::Arc;

use tracing::{error, info};

use crate::document::{DocumentStore, EMPLOYEES_KEY, VersionToken, encode};
use crate::error::AttendanceError;
use crate::model::attendance::canonical_employee_id;
use crate::model::employee::Employee;

/// The employee list, stored as one document.
#[derive(Clone)]
pub struct EmployeeRoster {
    documents: Arc<dyn DocumentStore>,
}

impl EmployeeRoster {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    async fn load(&self) -> Result<(Vec<Employee>, VersionToken), AttendanceError> {
        let doc = self.documents.load(EMPLOYEES_KEY).await.map_err(|e| {
            error!(error = %e, "Failed to load employees");
            AttendanceError::from(e)
        })?;
        Ok((doc.decode()?, doc.version))
    }

    async fn save(
        &self,
        employees: &[Employee],
        version: VersionToken,
    ) -> Result<(), AttendanceError> {
        let body = encode(employees)?;
        self.documents
            .save(EMPLOYEES_KEY, &body, Some(version))
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to save employees");
                AttendanceError::from(e)
            })?;
        Ok(())
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<Employee>, AttendanceError> {
        let (employees, _) = self.load().await?;
        Ok(employees
            .into_iter()
            .filter(|emp| !active_only || emp.is_active())
            .collect())
    }

    /// The employee behind a clock action. Inactive or unknown ids are refused.
    pub async fn require_active(&self, employee_id: &str) -> Result<Employee, AttendanceError> {
        let employee_id = canonical_employee_id(employee_id);
        self.list(true)
            .await?
            .into_iter()
            .find(|emp| emp.employee_id == employee_id)
            .ok_or(AttendanceError::UnknownEmployee(employee_id))
    }

    pub async fn add(&self, mut employee: Employee) -> Result<Employee, AttendanceError> {
        employee.employee_id = canonical_employee_id(&employee.employee_id);
        employee.name = employee.name.trim().to_string();
        employee.department = employee.department.trim().to_string();
        if employee.employee_id.is_empty() {
            return Err(AttendanceError::InvalidEmployee(
                "employee id must not be blank".to_string(),
            ));
        }
        if employee.name.is_empty() {
            return Err(AttendanceError::InvalidEmployee(
                "name must not be blank".to_string(),
            ));
        }

        let (mut employees, version) = self.load().await?;
        if employees
            .iter()
            .any(|emp| emp.employee_id == employee.employee_id)
        {
            return Err(AttendanceError::EmployeeExists(employee.employee_id));
        }
        employees.push(employee.clone());
        self.save(&employees, version).await?;

        info!(employee_id = %employee.employee_id, "Employee added");
        Ok(employee)
    }

    /// Attendance history of a removed employee is kept.
    pub async fn remove(&self, employee_id: &str) -> Result<Employee, AttendanceError> {
        let employee_id = canonical_employee_id(employee_id);
        let (mut employees, version) = self.load().await?;
        let idx = employees
            .iter()
            .position(|emp| emp.employee_id == employee_id)
            .ok_or(AttendanceError::NotFound)?;
        let removed = employees.remove(idx);
        self.save(&employees, version).await?;

        info!(employee_id = %employee_id, "Employee removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryStore;
    use crate::model::employee::EmployeeStatus;
    use serde_json::json;

    fn roster() -> EmployeeRoster {
        let store = MemoryStore::new().with_document(
            EMPLOYEES_KEY,
            json!([
                {"employeeId": "1001", "name": "Ana", "department": "Ops", "status": "Active"},
                {"employeeId": 1002, "name": "Ben", "department": "Ops", "status": "Inactive"}
            ]),
        );
        EmployeeRoster::new(Arc::new(store))
    }

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            employee_id: id.into(),
            name: name.into(),
            department: "Ops".into(),
            status: EmployeeStatus::Active,
        }
    }

    #[actix_web::test]
    async fn lists_only_active_when_asked() {
        let roster = roster();
        assert_eq!(roster.list(false).await.unwrap().len(), 2);
        let active = roster.list(true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].employee_id, "1001");
    }

    #[actix_web::test]
    async fn inactive_employees_cannot_clock() {
        let roster = roster();
        assert!(roster.require_active("1001").await.is_ok());
        assert_eq!(
            roster.require_active("1002").await,
            Err(AttendanceError::UnknownEmployee("1002".into()))
        );
    }

    #[actix_web::test]
    async fn duplicate_ids_are_refused() {
        let roster = roster();
        assert_eq!(
            roster.add(employee("1001.0", "Other")).await,
            Err(AttendanceError::EmployeeExists("1001".into()))
        );
        roster.add(employee("1003", "Cy")).await.unwrap();
        assert_eq!(roster.list(false).await.unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn blank_names_are_refused() {
        assert!(matches!(
            roster().add(employee("1004", "  ")).await,
            Err(AttendanceError::InvalidEmployee(_))
        ));
    }

    #[actix_web::test]
    async fn remove_reports_missing() {
        let roster = roster();
        roster.remove("1002").await.unwrap();
        assert_eq!(roster.remove("1002").await, Err(AttendanceError::NotFound));
    }
}
