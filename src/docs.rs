use crate::api::admin::{DashboardQuery, RecordKeyQuery, UpsertRecord};
use crate::api::attendance::{ClockOutResponse, ManualEntry, SubmitLog, TodayResponse};
use crate::api::employee::EmployeeOption;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeStatus};
use crate::service::DashboardRow;
use crate::store::UpsertOutcome;
use utoipa::Modify;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct AdminPin;

impl Modify for AdminPin {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_pin",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                    crate::auth::pin::PIN_HEADER,
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeclock API",
        version = "1.0.0",
        description = r#"
## Employee time tracking

Employees pick their ID, clock in, clock out and leave a short work log.
An administrator behind a PIN reviews, corrects and exports the records.

### 🔹 Clocking out
1. `POST /attendance/{employee_id}/clock-out` answers with the next step:
   - `AWAITING_LOG`: send the work log to `/clock-out/log`
   - `AWAITING_MANUAL_ENTRY`: no clock-in today, send it to `/manual-entry`
2. The pending step belongs to the `X-Session-Id` that started it and expires
   after a while.

### 🔐 Admin
Routes under `/admin` need the `X-Admin-Pin` header.

### 📦 Records
`{ date: "DD/MM/YYYY", employeeId, clockIn, clockOut, dailyLog }`, one per
employee per day.

---
Built with **Rust**, **Actix Web** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::today,
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::submit_log,
        crate::api::attendance::manual_entry,
        crate::api::attendance::state,

        crate::api::employee::list_active,
        crate::api::employee::list_all,
        crate::api::employee::add_employee,
        crate::api::employee::remove_employee,

        crate::api::admin::dashboard,
        crate::api::admin::upsert_record,
        crate::api::admin::delete_record,
        crate::api::admin::export
    ),
    components(
        schemas(
            AttendanceRecord,
            Employee,
            EmployeeStatus,
            EmployeeOption,
            TodayResponse,
            ClockOutResponse,
            SubmitLog,
            ManualEntry,
            DashboardRow,
            DashboardQuery,
            RecordKeyQuery,
            UpsertRecord,
            UpsertOutcome
        )
    ),
    modifiers(&AdminPin),
    tags(
        (name = "Attendance", description = "Clock in, clock out and daily logs"),
        (name = "Employee", description = "Employee picker"),
        (name = "Admin", description = "PIN-protected dashboard, corrections and export"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_admin_pin_scheme() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["components"]["securitySchemes"]["admin_pin"].is_object());
        assert!(json["paths"]["/api/attendance/{employee_id}/clock-out"].is_object());
    }

    #[test]
    fn dashboard_rows_are_referenced_by_name() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let items = &json["paths"]["/api/admin/attendance"]["get"]["responses"]["200"]["content"]
            ["application/json"]["schema"]["items"]["$ref"];
        assert_eq!(items, "#/components/schemas/DashboardRow");
        assert!(json["components"]["schemas"]["DashboardRow"].is_object());
    }
}
