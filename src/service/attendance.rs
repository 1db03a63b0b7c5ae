use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::document::{ATTENDANCE_KEY, DocumentStore, VersionToken, encode};
use crate::error::AttendanceError;
use crate::model::attendance::{
    AttendanceRecord, canonical_date, canonical_employee_id, normalize_date,
};
use crate::service::clock::Clock;
use crate::service::roster::EmployeeRoster;
use crate::store::{AttendanceStore, ClockOutState, RecordEdit, UpsertOutcome};
use crate::utils::csv_export::CsvExport;

/// A record joined with its employee's name, if the employee still exists.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardRow {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = "John Doe", nullable = true)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardFilter {
    pub date: Option<String>,
    pub employee_id: Option<String>,
}

/// Runs each attendance action as load, reconcile, save.
///
/// Nothing is cached between actions: every call starts from the stored
/// document and threads its version into the save, so a write based on a
/// stale copy fails with `PersistenceFailure` instead of overwriting someone
/// else's change. A failed save simply drops the working copy.
#[derive(Clone)]
pub struct AttendanceService {
    documents: Arc<dyn DocumentStore>,
    roster: EmployeeRoster,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        roster: EmployeeRoster,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            roster,
            clock,
        }
    }

    pub fn today(&self) -> String {
        self.clock.today_string()
    }

    async fn load(&self) -> Result<(AttendanceStore, VersionToken), AttendanceError> {
        let doc = self.documents.load(ATTENDANCE_KEY).await.map_err(|e| {
            error!(error = %e, "Failed to load attendance");
            AttendanceError::from(e)
        })?;
        Ok((AttendanceStore::new(doc.decode()?), doc.version))
    }

    /// Apply `action` to a fresh copy and persist it if anything changed.
    async fn mutate<T, F>(&self, action: &'static str, apply: F) -> Result<T, AttendanceError>
    where
        F: FnOnce(&mut AttendanceStore) -> Result<T, AttendanceError>,
    {
        let (mut store, version) = self.load().await?;
        let before = store.records().to_vec();

        let out = apply(&mut store).inspect_err(|e| {
            info!(action, reason = %e, "Attendance action rejected");
        })?;

        if store.records() != before.as_slice() {
            let body = encode(store.records())?;
            self.documents
                .save(ATTENDANCE_KEY, &body, Some(version))
                .await
                .map_err(|e| {
                    error!(error = %e, action, version = version.0, "Failed to save attendance");
                    AttendanceError::from(e)
                })?;
        }
        Ok(out)
    }

    pub async fn today_record(
        &self,
        employee_id: &str,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        let (store, _) = self.load().await?;
        Ok(store.find_today(employee_id, &self.today()).cloned())
    }

    pub async fn clock_in(&self, employee_id: &str) -> Result<AttendanceRecord, AttendanceError> {
        self.roster.require_active(employee_id).await?;
        let (today, now) = (self.today(), self.clock.time_string());

        let record = self
            .mutate("clock_in", |store| {
                store.clock_in(employee_id, &today, &now).cloned()
            })
            .await?;
        info!(employee_id, clock_in = %now, "Clocked in");
        Ok(record)
    }

    pub async fn clock_out(&self, employee_id: &str) -> Result<ClockOutState, AttendanceError> {
        self.roster.require_active(employee_id).await?;
        let (today, now) = (self.today(), self.clock.time_string());

        let state = self
            .mutate("clock_out", |store| store.clock_out(employee_id, &today, &now))
            .await?;
        info!(employee_id, state = state.name(), "Clock-out started");
        Ok(state)
    }

    pub async fn submit_log(
        &self,
        state: &ClockOutState,
        log: &str,
    ) -> Result<ClockOutState, AttendanceError> {
        let next = self
            .mutate("submit_log", |store| store.submit_log(state, log))
            .await?;
        if let ClockOutState::AwaitingLog {
            employee_id,
            clock_out,
            ..
        } = state
        {
            info!(employee_id = %employee_id, clock_out = %clock_out, "Clocked out");
        }
        Ok(next)
    }

    /// Backfill a missing clock-in. Allowed while this session is waiting for
    /// a manual entry, or when today's record still has no clock-in (the
    /// session that started it may have expired). Either way a record that
    /// already has a clock-in is refused with `AlreadyClockedIn`.
    pub async fn submit_manual_entry(
        &self,
        state: &ClockOutState,
        employee_id: &str,
        manual_clock_in: &str,
        log: &str,
    ) -> Result<AttendanceRecord, AttendanceError> {
        self.roster.require_active(employee_id).await?;
        let (today, now) = (self.today(), self.clock.time_string());
        let canonical_id = canonical_employee_id(employee_id);
        let pending = state.is_manual_entry_for(&today, &canonical_id);

        let record = self
            .mutate("manual_entry", |store| {
                let missing_clock_in = store
                    .find_today(employee_id, &today)
                    .is_some_and(|rec| rec.clock_in.is_none());
                if !pending && !missing_clock_in {
                    return Err(AttendanceError::NoPendingClockOut);
                }
                store
                    .submit_manual_entry(employee_id, &today, manual_clock_in, &now, log)
                    .cloned()
            })
            .await?;
        info!(employee_id, clock_in = manual_clock_in, clock_out = %now, "Manual entry recorded");
        Ok(record)
    }

    pub async fn admin_upsert(
        &self,
        date: &str,
        employee_id: &str,
        edit: RecordEdit<'_>,
    ) -> Result<UpsertOutcome, AttendanceError> {
        let outcome = self
            .mutate("admin_upsert", |store| store.admin_upsert(date, employee_id, edit))
            .await?;
        info!(date, employee_id, outcome = ?outcome, "Attendance record written by admin");
        Ok(outcome)
    }

    pub async fn admin_delete(
        &self,
        date: &str,
        employee_id: &str,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let removed = self
            .mutate("admin_delete", |store| store.admin_delete(date, employee_id))
            .await?;
        info!(date, employee_id, "Attendance record deleted by admin");
        Ok(removed)
    }

    /// All records, optionally filtered, joined to employee names.
    pub async fn dashboard(
        &self,
        filter: &DashboardFilter,
    ) -> Result<Vec<DashboardRow>, AttendanceError> {
        let date = filter.date.as_deref().map(normalize_date).transpose()?;
        let employee_id = filter.employee_id.as_deref().map(canonical_employee_id);

        let (store, _) = self.load().await?;
        let names: HashMap<String, String> = self
            .roster
            .list(false)
            .await?
            .into_iter()
            .map(|emp| (emp.employee_id, emp.name))
            .collect();

        let mut orphans = 0usize;
        let rows: Vec<DashboardRow> = store
            .into_records()
            .into_iter()
            .filter(|rec| date.as_ref().is_none_or(|d| canonical_date(&rec.date) == *d))
            .filter(|rec| {
                employee_id
                    .as_ref()
                    .is_none_or(|id| canonical_employee_id(&rec.employee_id) == *id)
            })
            .map(|record| {
                let name = names
                    .get(&canonical_employee_id(&record.employee_id))
                    .cloned();
                if name.is_none() {
                    orphans += 1;
                }
                DashboardRow { record, name }
            })
            .collect();

        if orphans > 0 {
            warn!(orphans, "Attendance records reference unknown employees");
        }
        Ok(rows)
    }

    pub async fn export_csv(&self) -> Result<String, AttendanceError> {
        let rows = self.dashboard(&DashboardFilter::default()).await?;
        let count = rows.len();
        let export: CsvExport = rows.into_iter().collect();
        info!(rows = count, "Attendance exported");
        Ok(export.render())
    }
}
