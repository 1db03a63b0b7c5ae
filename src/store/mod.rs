//! Attendance reconciliation.
//!
//! [`AttendanceStore`] owns one loaded copy of the attendance collection and
//! decides how each action changes it. It never persists anything; callers load
//! a store, apply one action and save the result. Every operation validates
//! before it touches a record, so a rejected action leaves the collection
//! exactly as it was.

pub mod session;

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::error::AttendanceError;
use crate::model::attendance::{
    AttendanceRecord, canonical_employee_id, normalize_date, normalize_log,
    normalize_optional_time, normalize_time,
};
pub use session::ClockOutState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Fields of an administrative edit. Absent (or blank) fields clear the record's value.
#[derive(Debug, Clone, Default)]
pub struct RecordEdit<'a> {
    pub clock_in: Option<&'a str>,
    pub clock_out: Option<&'a str>,
    pub daily_log: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceStore {
    records: Vec<AttendanceRecord>,
}

impl AttendanceStore {
    pub fn new(records: Vec<AttendanceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AttendanceRecord> {
        self.records
    }

    /// Index of the first record with this key. Later duplicates are ignored.
    fn position(&self, date: &str, employee_id: &str) -> Option<usize> {
        let mut matches = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, rec)| rec.has_key(date, employee_id))
            .map(|(idx, _)| idx);

        let first = matches.next()?;
        let duplicates = matches.count();
        if duplicates > 0 {
            warn!(
                date,
                employee_id, duplicates, "Duplicate attendance records for one day, using the first"
            );
        }
        Some(first)
    }

    pub fn find_today(&self, employee_id: &str, today: &str) -> Option<&AttendanceRecord> {
        let today = normalize_date(today).ok()?;
        let employee_id = canonical_employee_id(employee_id);
        self.position(&today, &employee_id).map(|idx| &self.records[idx])
    }

    /// Start the day. A record left behind by a clock-out without clock-in gets
    /// its clock-in filled rather than a second row.
    pub fn clock_in(
        &mut self,
        employee_id: &str,
        today: &str,
        now: &str,
    ) -> Result<&AttendanceRecord, AttendanceError> {
        let (today, employee_id) = key(today, employee_id)?;
        let now = normalize_time(now)?;

        let idx = match self.position(&today, &employee_id) {
            Some(idx) => {
                let rec = &mut self.records[idx];
                if rec.clock_in.is_some() {
                    return Err(AttendanceError::AlreadyClockedIn);
                }
                rec.clock_in = Some(now);
                idx
            }
            None => {
                let mut rec = AttendanceRecord::new(today, employee_id);
                rec.clock_in = Some(now);
                self.records.push(rec);
                self.records.len() - 1
            }
        };
        Ok(&self.records[idx])
    }

    /// First half of a clock-out. Only the no-record branch writes anything;
    /// the normal path holds `now` in the returned state until a log arrives.
    pub fn clock_out(
        &mut self,
        employee_id: &str,
        today: &str,
        now: &str,
    ) -> Result<ClockOutState, AttendanceError> {
        let (today, employee_id) = key(today, employee_id)?;
        let now = normalize_time(now)?;

        let Some(idx) = self.position(&today, &employee_id) else {
            let mut rec = AttendanceRecord::new(today.clone(), employee_id.clone());
            rec.clock_out = Some(now);
            self.records.push(rec);
            return Ok(ClockOutState::AwaitingManualEntry {
                date: today,
                employee_id,
            });
        };

        let rec = &self.records[idx];
        if rec.clock_out.is_some() {
            return Err(AttendanceError::AlreadyClockedOut);
        }
        if rec.clock_in.is_none() {
            return Ok(ClockOutState::AwaitingManualEntry {
                date: today,
                employee_id,
            });
        }
        Ok(ClockOutState::AwaitingLog {
            date: today,
            employee_id,
            clock_out: now,
        })
    }

    /// Commit a pending clock-out with its daily log.
    pub fn submit_log(
        &mut self,
        state: &ClockOutState,
        log: &str,
    ) -> Result<ClockOutState, AttendanceError> {
        let ClockOutState::AwaitingLog {
            date,
            employee_id,
            clock_out,
        } = state
        else {
            return Err(AttendanceError::NoPendingClockOut);
        };
        let log = normalize_log(log)?;

        let idx = self
            .position(date, employee_id)
            .ok_or(AttendanceError::NotFound)?;
        let rec = &mut self.records[idx];
        if rec.clock_out.is_some() {
            return Err(AttendanceError::AlreadyClockedOut);
        }
        rec.clock_out = Some(clock_out.clone());
        rec.daily_log = Some(log);
        Ok(ClockOutState::Idle)
    }

    /// Complete a day that is missing its clock-in. A day that gained a
    /// clock-in meanwhile (another session finished it) is left alone.
    pub fn submit_manual_entry(
        &mut self,
        employee_id: &str,
        today: &str,
        manual_clock_in: &str,
        now: &str,
        log: &str,
    ) -> Result<&AttendanceRecord, AttendanceError> {
        let (today, employee_id) = key(today, employee_id)?;
        let manual_clock_in = normalize_time(manual_clock_in)?;
        let now = normalize_time(now)?;
        let log = normalize_log(log)?;

        let idx = self
            .position(&today, &employee_id)
            .ok_or(AttendanceError::NotFound)?;
        let rec = &mut self.records[idx];
        if rec.clock_in.is_some() {
            return Err(AttendanceError::AlreadyClockedIn);
        }
        rec.clock_in = Some(manual_clock_in);
        rec.clock_out = Some(now);
        rec.daily_log = Some(log);
        Ok(&self.records[idx])
    }

    /// Insert or fully overwrite the record for `(date, employee_id)`.
    pub fn admin_upsert(
        &mut self,
        date: &str,
        employee_id: &str,
        edit: RecordEdit<'_>,
    ) -> Result<UpsertOutcome, AttendanceError> {
        let (date, employee_id) = key(date, employee_id)?;
        let clock_in = normalize_optional_time(edit.clock_in)?;
        let clock_out = normalize_optional_time(edit.clock_out)?;
        let daily_log = match edit.daily_log.map(str::trim) {
            None | Some("") => None,
            Some(log) => Some(normalize_log(log)?),
        };

        let outcome = match self.position(&date, &employee_id) {
            Some(idx) => {
                let rec = &mut self.records[idx];
                rec.clock_in = clock_in;
                rec.clock_out = clock_out;
                rec.daily_log = daily_log;
                UpsertOutcome::Replaced
            }
            None => {
                self.records.push(AttendanceRecord {
                    date,
                    employee_id,
                    clock_in,
                    clock_out,
                    daily_log,
                });
                UpsertOutcome::Inserted
            }
        };
        Ok(outcome)
    }

    pub fn admin_delete(
        &mut self,
        date: &str,
        employee_id: &str,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let (date, employee_id) = key(date, employee_id)?;
        let idx = self
            .position(&date, &employee_id)
            .ok_or(AttendanceError::NotFound)?;
        Ok(self.records.remove(idx))
    }
}

fn key(date: &str, employee_id: &str) -> Result<(String, String), AttendanceError> {
    let date = normalize_date(date)?;
    let employee_id = canonical_employee_id(employee_id);
    if employee_id.is_empty() {
        return Err(AttendanceError::InvalidEmployee(
            "employee id must not be blank".to_string(),
        ));
    }
    Ok((date, employee_id))
}
