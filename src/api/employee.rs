use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::model::employee::Employee;
use crate::service::EmployeeRoster;

/// Entry of the employee picker.
#[derive(Serialize, ToSchema)]
pub struct EmployeeOption {
    #[schema(example = "1001")]
    pub employee_id: String,
    #[schema(example = "John Doe (1001)")]
    pub label: String,
    #[schema(example = "Warehouse")]
    pub department: String,
}

impl From<Employee> for EmployeeOption {
    fn from(emp: Employee) -> Self {
        Self {
            label: emp.label(),
            employee_id: emp.employee_id,
            department: emp.department,
        }
    }
}

/// Active employees who can clock in
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Active employees", body = [EmployeeOption]),
        (status = 503, description = "Employee data unavailable")
    ),
    tag = "Employee"
)]
pub async fn list_active(roster: web::Data<EmployeeRoster>) -> actix_web::Result<impl Responder> {
    let options: Vec<EmployeeOption> = roster
        .list(true)
        .await?
        .into_iter()
        .map(EmployeeOption::from)
        .collect();

    Ok(HttpResponse::Ok().json(options))
}

/// All employees, including inactive ones
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Employee roster", body = [Employee]),
        (status = 401, description = "Missing or incorrect PIN")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn list_all(roster: web::Data<EmployeeRoster>) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(roster.list(false).await?))
}

/// Add Employee
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = Employee,
    responses(
        (status = 201, description = "Employee added", body = Employee),
        (status = 400, description = "Blank id or name"),
        (status = 409, description = "Employee id already used"),
        (status = 401, description = "Missing or incorrect PIN"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn add_employee(
    roster: web::Data<EmployeeRoster>,
    payload: web::Json<Employee>,
) -> actix_web::Result<impl Responder> {
    let employee = roster.add(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

/// Remove Employee
///
/// Attendance records of the employee are kept.
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Missing or incorrect PIN"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn remove_employee(
    roster: web::Data<EmployeeRoster>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let removed = roster.remove(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted",
        "employee": removed
    })))
}
