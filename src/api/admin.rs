use actix_web::{HttpResponse, Responder, http::header, web};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::model::attendance::employee_id_from_json;
use crate::service::{AttendanceService, DashboardFilter};
use crate::store::RecordEdit;
use crate::utils::csv_export;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Only this day (DD/MM/YYYY)
    pub date: Option<String>,
    /// Only this employee
    pub employee_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RecordKeyQuery {
    #[schema(example = "01/01/2030")]
    pub date: String,
    #[schema(example = "1001")]
    pub employee_id: String,
}

/// Full replacement of one day's record; omitted fields are cleared.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertRecord {
    #[schema(example = "01/01/2030")]
    pub date: String,
    #[serde(deserialize_with = "employee_id_from_json")]
    #[schema(example = "1001", value_type = String)]
    pub employee_id: String,
    #[schema(example = "08:00:00", nullable = true)]
    pub clock_in: Option<String>,
    #[schema(example = "17:00:00", nullable = true)]
    pub clock_out: Option<String>,
    #[schema(example = "Corrected by HR", nullable = true, max_length = 150)]
    pub daily_log: Option<String>,
}

/// Attendance dashboard
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Records joined with employee names", body = [DashboardRow]),
        (status = 400, description = "Invalid date filter"),
        (status = 401, description = "Missing or incorrect PIN")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn dashboard(
    query: web::Query<DashboardQuery>,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();
    let rows = service
        .dashboard(&DashboardFilter {
            date: query.date.filter(|d| !d.trim().is_empty()),
            employee_id: query.employee_id.filter(|id| !id.trim().is_empty()),
        })
        .await?;

    Ok(HttpResponse::Ok().json(rows))
}

/// Create or replace a record
#[utoipa::path(
    put,
    path = "/api/admin/attendance",
    request_body = UpsertRecord,
    responses(
        (status = 200, description = "Record written", body = Object, example = json!({
            "outcome": "replaced"
        })),
        (status = 400, description = "Invalid date, time or log"),
        (status = 401, description = "Missing or incorrect PIN"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn upsert_record(
    payload: web::Json<UpsertRecord>,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let edit = RecordEdit {
        clock_in: payload.clock_in.as_deref(),
        clock_out: payload.clock_out.as_deref(),
        daily_log: payload.daily_log.as_deref(),
    };
    let outcome = service
        .admin_upsert(&payload.date, &payload.employee_id, edit)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "outcome": outcome })))
}

/// Delete a record
#[utoipa::path(
    delete,
    path = "/api/admin/attendance",
    params(RecordKeyQuery),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Attendance record not found"),
        (status = 401, description = "Missing or incorrect PIN"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn delete_record(
    query: web::Query<RecordKeyQuery>,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let removed = service
        .admin_delete(&query.date, &query.employee_id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted",
        "record": removed
    })))
}

/// Download all records as CSV
#[utoipa::path(
    get,
    path = "/api/admin/attendance/export",
    responses(
        (status = 200, description = "CSV file", body = String, content_type = "text/csv"),
        (status = 401, description = "Missing or incorrect PIN")
    ),
    tag = "Admin",
    security(("admin_pin" = []))
)]
pub async fn export(service: web::Data<AttendanceService>) -> actix_web::Result<impl Responder> {
    let csv = service.export_csv().await?;

    Ok(HttpResponse::Ok()
        .content_type(csv_export::CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", csv_export::FILE_NAME),
        ))
        .body(csv))
}
