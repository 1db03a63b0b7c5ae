use chrono::{FixedOffset, NaiveDateTime, Utc};

use crate::model::attendance::{DATE_FORMAT, TIME_FORMAT};

pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn today_string(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }

    fn time_string(&self) -> String {
        self.now().format(TIME_FORMAT).to_string()
    }
}

/// System time shifted by a fixed UTC offset. No DST handling.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.offset).naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn formats_day_first() {
        let at = NaiveDate::from_ymd_opt(2030, 1, 2)
            .and_then(|d| d.and_hms_opt(8, 5, 9))
            .unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.today_string(), "02/01/2030");
        assert_eq!(clock.time_string(), "08:05:09");
    }

    #[test]
    fn offset_shifts_wall_clock() {
        let utc = SystemClock::new(FixedOffset::east_opt(0).unwrap()).now();
        let ahead = SystemClock::new(FixedOffset::east_opt(3600).unwrap()).now();
        let diff = (ahead - utc).num_minutes();
        assert!((59..=60).contains(&diff));
    }
}
