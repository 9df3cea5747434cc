//! Attendance events.
//!
//! Records form an append-only log: nothing prevents several records for the
//! same student on the same day. Only an explicit update rewrites a record.

use std::str::FromStr;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{STATUS_ABSENT, STATUS_EXCUSED, STATUS_LATE, STATUS_PRESENT};
use crate::errors::{AppError, AppResult};

/// Closed set of attendance statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::Present,
        AttendanceStatus::Absent,
        AttendanceStatus::Late,
        AttendanceStatus::Excused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => STATUS_PRESENT,
            AttendanceStatus::Absent => STATUS_ABSENT,
            AttendanceStatus::Late => STATUS_LATE,
            AttendanceStatus::Excused => STATUS_EXCUSED,
        }
    }
}

/// Status applied to an enrolled student missing from a bulk status map.
impl Default for AttendanceStatus {
    fn default() -> Self {
        AttendanceStatus::Absent
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> AppResult<Self> {
        match value {
            STATUS_PRESENT => Ok(AttendanceStatus::Present),
            STATUS_ABSENT => Ok(AttendanceStatus::Absent),
            STATUS_LATE => Ok(AttendanceStatus::Late),
            STATUS_EXCUSED => Ok(AttendanceStatus::Excused),
            other => Err(AppError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored attendance event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub attendance_id: i32,
    pub student_id: i32,
    /// Account that recorded (or last updated) the record
    pub recorded_by: i32,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}

/// Attendance record joined with the display names of student and recorder.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub attendance_id: i32,
    pub student_id: i32,
    pub student_name: String,
    pub recorded_by: i32,
    pub recorded_by_name: String,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
}

/// Number of records carrying one status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: AttendanceStatus,
    pub count: i64,
}

/// Outcome of recording a whole class.
///
/// Per-student insert failures do not abort the batch; callers must inspect
/// `error_count` to detect a partially recorded class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BulkResult {
    /// Number of enrolled students at the time of recording
    pub total: usize,
    pub success_count: usize,
    pub error_count: usize,
}

impl BulkResult {
    pub fn is_partial(&self) -> bool {
        self.error_count > 0
    }
}

/// Inclusive range of calendar dates, compared against the UTC date of `recorded_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::validation("Start date must not be after end date"));
        }
        Ok(Self { start, end })
    }

    /// First instant of the start date.
    pub fn lower_bound(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the end date (exclusive bound).
    pub fn upper_bound(&self) -> DateTime<Utc> {
        self.end
            .checked_add_days(Days::new(1))
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let date = instant.date_naive();
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_all_statuses_parse() {
        for status in AttendanceStatus::ALL {
            assert_eq!(status.as_str().parse::<AttendanceStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        for value in ["", "Present", "tardy", "absent "] {
            let err = value.parse::<AttendanceStatus>().unwrap_err();
            assert!(matches!(err, AppError::InvalidStatus(v) if v == value));
        }
    }

    #[test]
    fn test_default_status_is_absent() {
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Absent);
    }

    #[test]
    fn test_date_range_is_inclusive_on_both_ends() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
        )
        .unwrap();

        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        assert!(range.contains(Utc.with_ymd_and_hms(2024, 3, 2, 23, 59, 59).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()));
        assert!(!range.contains(Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap()));
        assert_eq!(
            range.upper_bound(),
            Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_single_day_range() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let range = DateRange::new(day, day).unwrap();
        assert_eq!(range.lower_bound(), Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap());
        assert_eq!(range.upper_bound(), Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let result = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
