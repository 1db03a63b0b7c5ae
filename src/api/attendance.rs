use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::session::SessionId;
use crate::model::attendance::{AttendanceRecord, canonical_employee_id};
use crate::service::AttendanceService;
use crate::store::ClockOutState;
use crate::utils::session_cache::{SessionCache, SessionKey};

#[derive(Serialize, ToSchema)]
pub struct TodayResponse {
    #[schema(example = "01/01/2030")]
    pub date: String,
    #[schema(nullable = true)]
    pub record: Option<AttendanceRecord>,
    pub can_clock_in: bool,
    pub can_clock_out: bool,
    /// Clock-in, clock-out and log are all recorded.
    pub completed: bool,
    #[schema(example = "IDLE")]
    pub state: String,
}

#[derive(Serialize, ToSchema)]
pub struct ClockOutResponse {
    /// `AWAITING_LOG` or `AWAITING_MANUAL_ENTRY`
    #[schema(example = "AWAITING_LOG")]
    pub state: String,
    /// Time that will be recorded once the log is submitted.
    #[schema(example = "17:00:00", nullable = true)]
    pub clock_out: Option<String>,
    pub message: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitLog {
    #[schema(example = "Packed 40 orders", max_length = 150)]
    pub log: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ManualEntry {
    #[schema(example = "08:00")]
    pub clock_in: String,
    #[schema(example = "Forgot to clock in", max_length = 150)]
    pub log: String,
}

fn session_key(session: &SessionId, service: &AttendanceService, employee_id: &str) -> SessionKey {
    SessionKey::new(&session.0, &service.today(), &canonical_employee_id(employee_id))
}

/// Today's record and which actions are open
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/today",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("X-Session-Id" = String, Header, description = "Client session id")
    ),
    responses(
        (status = 200, description = "Today's attendance", body = TodayResponse),
        (status = 503, description = "Attendance data unavailable")
    ),
    tag = "Attendance"
)]
pub async fn today(
    session: SessionId,
    path: web::Path<String>,
    service: web::Data<AttendanceService>,
    sessions: web::Data<SessionCache>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let record = service.today_record(&employee_id).await?;
    let state = sessions
        .get(&session_key(&session, &service, &employee_id))
        .await;

    Ok(HttpResponse::Ok().json(TodayResponse {
        date: service.today(),
        can_clock_in: record.as_ref().is_none_or(|r| r.clock_in.is_none()),
        can_clock_out: record.as_ref().is_none_or(|r| r.clock_out.is_none()),
        completed: record.as_ref().is_some_and(AttendanceRecord::is_complete),
        record,
        state: state.name().to_string(),
    }))
}

/// Clock in
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/clock-in",
    params(("employee_id", Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in at 08:00:00"
        })),
        (status = 404, description = "No active employee with this id"),
        (status = 409, description = "Already clocked in today"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    path: web::Path<String>,
    service: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let record = service.clock_in(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Clocked in at {}", record.clock_in.as_deref().unwrap_or_default()),
        "record": record
    })))
}

/// Start clocking out
///
/// Either waits for a daily log or, when the day has no clock-in, for a
/// manual entry.
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/clock-out",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("X-Session-Id" = String, Header, description = "Client session id")
    ),
    responses(
        (status = 200, description = "Clock-out pending", body = ClockOutResponse),
        (status = 404, description = "No active employee with this id"),
        (status = 409, description = "Already clocked out today"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    session: SessionId,
    path: web::Path<String>,
    service: web::Data<AttendanceService>,
    sessions: web::Data<SessionCache>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let state = service.clock_out(&employee_id).await?;

    let message = match &state {
        ClockOutState::AwaitingLog { .. } => "Submit your work log to finish clocking out",
        _ => "No clock-in found for today, enter your clock-in time",
    };
    let response = ClockOutResponse {
        state: state.name().to_string(),
        clock_out: state.pending_clock_out().map(String::from),
        message: message.to_string(),
    };
    sessions
        .put(session_key(&session, &service, &employee_id), state)
        .await;

    Ok(HttpResponse::Ok().json(response))
}

/// Finish clocking out with the daily log
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/clock-out/log",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("X-Session-Id" = String, Header, description = "Client session id")
    ),
    request_body = SubmitLog,
    responses(
        (status = 200, description = "Clocked out", body = AttendanceRecord),
        (status = 400, description = "Log empty or too long"),
        (status = 409, description = "No pending clock-out, or already clocked out"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Attendance"
)]
pub async fn submit_log(
    session: SessionId,
    path: web::Path<String>,
    payload: web::Json<SubmitLog>,
    service: web::Data<AttendanceService>,
    sessions: web::Data<SessionCache>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let key = session_key(&session, &service, &employee_id);
    let state = sessions.get(&key).await;

    let next = service.submit_log(&state, &payload.log).await?;
    sessions.put(key, next).await;

    let record = service.today_record(&employee_id).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Backfill a missing clock-in and clock out
#[utoipa::path(
    post,
    path = "/api/attendance/{employee_id}/manual-entry",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("X-Session-Id" = String, Header, description = "Client session id")
    ),
    request_body = ManualEntry,
    responses(
        (status = 200, description = "Day completed", body = AttendanceRecord),
        (status = 400, description = "Invalid time, or log empty or too long"),
        (status = 404, description = "No record for today"),
        (status = 409, description = "No manual entry is pending"),
        (status = 503, description = "Could not save, retry")
    ),
    tag = "Attendance"
)]
pub async fn manual_entry(
    session: SessionId,
    path: web::Path<String>,
    payload: web::Json<ManualEntry>,
    service: web::Data<AttendanceService>,
    sessions: web::Data<SessionCache>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let key = session_key(&session, &service, &employee_id);
    let state = sessions.get(&key).await;

    let record = service
        .submit_manual_entry(&state, &employee_id, &payload.clock_in, &payload.log)
        .await?;
    sessions.put(key, ClockOutState::Idle).await;

    Ok(HttpResponse::Ok().json(record))
}

/// Pending clock-out state of this session
#[utoipa::path(
    get,
    path = "/api/attendance/{employee_id}/state",
    params(
        ("employee_id", Path, description = "Employee ID"),
        ("X-Session-Id" = String, Header, description = "Client session id")
    ),
    responses((status = 200, description = "Current state", body = Object, example = json!({
        "state": "AWAITING_LOG", "date": "01/01/2030", "employee_id": "1001", "clock_out": "17:00:00"
    }))),
    tag = "Attendance"
)]
pub async fn state(
    session: SessionId,
    path: web::Path<String>,
    service: web::Data<AttendanceService>,
    sessions: web::Data<SessionCache>,
) -> impl Responder {
    let key = session_key(&session, &service, &path.into_inner());
    HttpResponse::Ok().json(sessions.get(&key).await)
}
