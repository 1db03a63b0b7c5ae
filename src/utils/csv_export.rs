//! CSV export of the attendance dashboard.

use crate::service::attendance::DashboardRow;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const FILE_NAME: &str = "attendance.csv";

/// Collects dashboard rows and renders them as one CSV document.
#[derive(Debug, Default)]
pub struct CsvExport {
    rows: Vec<DashboardRow>,
}

impl CsvExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: DashboardRow) {
        self.rows.push(row);
    }

    fn header() -> &'static str {
        "Date,EmployeeID,Name,ClockIn,ClockOut,Log"
    }

    /// Quote fields containing a comma, quote or line break; double embedded quotes.
    fn escape_field(field: &str) -> String {
        if field.contains([',', '"', '\n', '\r']) {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(row: &DashboardRow) -> String {
        let rec = &row.record;
        [
            rec.date.as_str(),
            rec.employee_id.as_str(),
            row.name.as_deref().unwrap_or(""),
            rec.clock_in.as_deref().unwrap_or(""),
            rec.clock_out.as_deref().unwrap_or(""),
            rec.daily_log.as_deref().unwrap_or(""),
        ]
        .iter()
        .map(|field| Self::escape_field(field))
        .collect::<Vec<_>>()
        .join(",")
    }

    pub fn render(&self) -> String {
        let mut out = String::from(Self::header());
        out.push('\n');
        for row in &self.rows {
            out.push_str(&Self::format_row(row));
            out.push('\n');
        }
        out
    }
}

impl FromIterator<DashboardRow> for CsvExport {
    fn from_iter<I: IntoIterator<Item = DashboardRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
