use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::error::AttendanceError;

/// Display form of attendance dates, e.g. `01/01/2030`.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
/// Wall-clock form used when the service stamps a time itself.
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const MAX_LOG_CHARS: usize = 150;

/// One employee's attendance for one day. `(date, employee_id)` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "date": "01/01/2030",
    "employeeId": "1001",
    "clockIn": "08:00:00",
    "clockOut": "17:00:00",
    "dailyLog": "did work"
}))]
pub struct AttendanceRecord {
    #[schema(example = "01/01/2030")]
    pub date: String,

    #[serde(deserialize_with = "employee_id_from_json")]
    #[schema(example = "1001")]
    pub employee_id: String,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(example = "08:00:00", nullable = true)]
    pub clock_in: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(example = "17:00:00", nullable = true)]
    pub clock_out: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    #[schema(example = "did work", nullable = true)]
    pub daily_log: Option<String>,
}

impl AttendanceRecord {
    pub fn new(date: impl Into<String>, employee_id: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            employee_id: employee_id.into(),
            clock_in: None,
            clock_out: None,
            daily_log: None,
        }
    }

    /// `date` and `employee_id` must already be canonical.
    pub fn has_key(&self, date: &str, employee_id: &str) -> bool {
        canonical_date(&self.date) == date && canonical_employee_id(&self.employee_id) == employee_id
    }

    pub fn is_complete(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_some() && self.daily_log.is_some()
    }
}

/// Canonical string form of an employee id.
///
/// Spreadsheet round-trips turn `1001` into `1001.0`; both map to `"1001"`.
pub fn canonical_employee_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((whole, frac)) = trimmed.split_once('.') {
        let integral = !whole.is_empty() && whole.chars().all(|c| c.is_ascii_digit());
        if integral && !frac.is_empty() && frac.chars().all(|c| c == '0') {
            return whole.to_string();
        }
    }
    trimmed.to_string()
}

/// Lenient form used when comparing stored dates: re-renders parseable dates
/// zero-padded, leaves anything else trimmed as is.
pub fn canonical_date(raw: &str) -> String {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => date.format(DATE_FORMAT).to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Strict form for caller-supplied dates.
pub fn normalize_date(raw: &str) -> Result<String, AttendanceError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .map_err(|_| AttendanceError::InvalidDate(raw.to_string()))
}

/// Accepts `HH:MM:SS` or `HH:MM` and keeps whichever precision was given.
pub fn normalize_time(raw: &str) -> Result<String, AttendanceError> {
    let trimmed = raw.trim();
    let valid = NaiveTime::parse_from_str(trimmed, "%H:%M:%S").is_ok()
        || NaiveTime::parse_from_str(trimmed, "%H:%M").is_ok();
    if valid {
        Ok(trimmed.to_string())
    } else {
        Err(AttendanceError::InvalidTime(raw.to_string()))
    }
}

/// Optional time from a form: blank means absent.
pub fn normalize_optional_time(raw: Option<&str>) -> Result<Option<String>, AttendanceError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => normalize_time(value).map(Some),
    }
}

pub fn normalize_log(raw: &str) -> Result<String, AttendanceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AttendanceError::EmptyLog);
    }
    if trimmed.chars().count() > MAX_LOG_CHARS {
        return Err(AttendanceError::LogTooLong { max: MAX_LOG_CHARS });
    }
    Ok(trimmed.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEmployeeId {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
}

/// Whole floats that fit an `i64` print without the fraction; anything else
/// keeps its float rendering rather than saturating.
fn float_id(f: f64) -> String {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f) {
        (f as i64).to_string()
    } else {
        f.to_string()
    }
}

pub(crate) fn employee_id_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match RawEmployeeId::deserialize(deserializer)? {
        RawEmployeeId::Text(s) => s,
        RawEmployeeId::Int(i) => i.to_string(),
        RawEmployeeId::UInt(u) => u.to_string(),
        RawEmployeeId::Float(f) => float_id(f),
    };
    Ok(canonical_employee_id(&raw))
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn employee_ids_are_coerced() {
        assert_eq!(canonical_employee_id(" 1001 "), "1001");
        assert_eq!(canonical_employee_id("1001.0"), "1001");
        assert_eq!(canonical_employee_id("1001.5"), "1001.5");
        assert_eq!(canonical_employee_id("EMP-7"), "EMP-7");
    }

    #[test]
    fn numeric_ids_deserialize_as_strings() {
        let rec: AttendanceRecord = serde_json::from_value(json!({
            "date": "01/01/2030",
            "employeeId": 1001.0,
            "clockIn": "08:00:00",
            "clockOut": null
        }))
        .unwrap();
        assert_eq!(rec.employee_id, "1001");
        assert_eq!(rec.clock_out, None);
        assert_eq!(rec.daily_log, None);
    }

    #[test]
    fn huge_numeric_ids_are_not_clamped() {
        let id = |value: serde_json::Value| {
            serde_json::from_value::<AttendanceRecord>(json!({
                "date": "01/01/2030",
                "employeeId": value
            }))
            .unwrap()
            .employee_id
        };
        assert_eq!(id(json!(1e30)), "1000000000000000000000000000000");
        assert_eq!(id(json!(u64::MAX)), "18446744073709551615");
        assert_eq!(id(json!(-7.0)), "-7");
        assert_ne!(id(json!(1e19)), i64::MAX.to_string());
    }

    #[test]
    fn blank_fields_read_as_absent() {
        let rec: AttendanceRecord = serde_json::from_value(json!({
            "date": "01/01/2030",
            "employeeId": "1001",
            "clockIn": "",
            "dailyLog": "   "
        }))
        .unwrap();
        assert_eq!(rec.clock_in, None);
        assert_eq!(rec.daily_log, None);
    }

    #[test]
    fn serializes_with_fixed_field_names() {
        let value = serde_json::to_value(AttendanceRecord::new("01/01/2030", "1001")).unwrap();
        assert_eq!(
            value,
            json!({
                "date": "01/01/2030",
                "employeeId": "1001",
                "clockIn": null,
                "clockOut": null,
                "dailyLog": null
            })
        );
    }

    #[test]
    fn dates_are_padded_and_validated() {
        assert_eq!(normalize_date("1/1/2030").unwrap(), "01/01/2030");
        assert_eq!(canonical_date("legacy"), "legacy");
        assert!(matches!(
            normalize_date("2030-01-01"),
            Err(AttendanceError::InvalidDate(_))
        ));
    }

    #[test]
    fn times_accept_both_precisions() {
        assert_eq!(normalize_time("08:00").unwrap(), "08:00");
        assert_eq!(normalize_time("08:00:30").unwrap(), "08:00:30");
        assert!(normalize_time("8am").is_err());
        assert_eq!(normalize_optional_time(Some("  ")).unwrap(), None);
    }

    #[test]
    fn logs_are_bounded() {
        assert_eq!(normalize_log("  "), Err(AttendanceError::EmptyLog));
        assert!(normalize_log(&"x".repeat(MAX_LOG_CHARS)).is_ok());
        assert_eq!(
            normalize_log(&"x".repeat(MAX_LOG_CHARS + 1)),
            Err(AttendanceError::LogTooLong { max: MAX_LOG_CHARS })
        );
    }
}
