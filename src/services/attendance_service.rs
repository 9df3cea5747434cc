//! Attendance service - recording, correction and reporting of attendance.
//!
//! Recording is the only place where statuses arrive as free text, so both
//! recording paths parse every status before the first store call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, BulkResult, DateRange, StatusCount,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::Repositories;

/// Attendance service trait for dependency injection.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    /// Append one record for a student.
    async fn record_one(&self, student_id: i32, recorded_by: i32, status: &str) -> AppResult<AttendanceRecord>;

    /// Append one record per enrolled student of a class.
    ///
    /// Students missing from `statuses` are recorded as absent. Entries for
    /// accounts not enrolled in the class are ignored. The batch is
    /// best-effort: a failed insert is logged and counted, and the remaining
    /// students are still recorded.
    async fn record_for_class(
        &self,
        class_id: i32,
        recorded_by: i32,
        statuses: HashMap<i32, String>,
    ) -> AppResult<BulkResult>;

    async fn list_all(&self) -> AppResult<Vec<AttendanceEntry>>;

    async fn list_recorded_by(&self, recorded_by: i32) -> AppResult<Vec<AttendanceEntry>>;

    async fn list_for_student(&self, student_id: i32) -> AppResult<Vec<AttendanceEntry>>;

    async fn list_for_class(&self, class_id: i32) -> AppResult<Vec<AttendanceEntry>>;

    async fn list_between(&self, range: DateRange) -> AppResult<Vec<AttendanceEntry>>;

    /// Per-status counts, for one student or across all records
    async fn stats(&self, student_id: Option<i32>) -> AppResult<Vec<StatusCount>>;

    /// Rewrite status and recorder of an existing record
    async fn update(&self, attendance_id: i32, status: &str, recorded_by: i32) -> AppResult<AttendanceEntry>;

    async fn delete(&self, attendance_id: i32) -> AppResult<()>;
}

/// Concrete implementation of AttendanceService.
pub struct AttendanceManager<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> AttendanceManager<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl<R: Repositories> AttendanceService for AttendanceManager<R> {
    async fn record_one(&self, student_id: i32, recorded_by: i32, status: &str) -> AppResult<AttendanceRecord> {
        let status: AttendanceStatus = status.parse()?;

        let student = self
            .repos
            .accounts()
            .find_by_id(student_id)
            .await?
            .ok_or_not_found()?;
        if !student.is_student() {
            return Err(AppError::validation("Attendance can only be recorded for students"));
        }

        self.repos
            .attendance()
            .create(student_id, recorded_by, status)
            .await
    }

    async fn record_for_class(
        &self,
        class_id: i32,
        recorded_by: i32,
        statuses: HashMap<i32, String>,
    ) -> AppResult<BulkResult> {
        let statuses = statuses
            .into_iter()
            .map(|(student_id, status)| Ok((student_id, status.parse::<AttendanceStatus>()?)))
            .collect::<AppResult<HashMap<_, _>>>()?;

        let rosters = self.repos.rosters();
        if rosters.find_class(class_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        let enrolled = rosters.enrolled_student_ids(class_id).await?;

        let attendance = self.repos.attendance();
        let mut result = BulkResult {
            total: enrolled.len(),
            ..Default::default()
        };

        for student_id in enrolled {
            let status = statuses.get(&student_id).copied().unwrap_or_default();
            match attendance.create(student_id, recorded_by, status).await {
                Ok(_) => result.success_count += 1,
                Err(e) => {
                    tracing::warn!(class_id, student_id, error = %e, "Failed to record attendance");
                    result.error_count += 1;
                }
            }
        }

        tracing::info!(
            class_id,
            recorded_by,
            total = result.total,
            success = result.success_count,
            errors = result.error_count,
            "Class attendance recorded"
        );
        Ok(result)
    }

    async fn list_all(&self) -> AppResult<Vec<AttendanceEntry>> {
        self.repos.attendance().list_all().await
    }

    async fn list_recorded_by(&self, recorded_by: i32) -> AppResult<Vec<AttendanceEntry>> {
        self.repos.attendance().list_by_recorder(recorded_by).await
    }

    async fn list_for_student(&self, student_id: i32) -> AppResult<Vec<AttendanceEntry>> {
        self.repos.attendance().list_by_student(student_id).await
    }

    async fn list_for_class(&self, class_id: i32) -> AppResult<Vec<AttendanceEntry>> {
        if self.repos.rosters().find_class(class_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.repos.attendance().list_by_class(class_id).await
    }

    async fn list_between(&self, range: DateRange) -> AppResult<Vec<AttendanceEntry>> {
        self.repos.attendance().list_by_date_range(range).await
    }

    async fn stats(&self, student_id: Option<i32>) -> AppResult<Vec<StatusCount>> {
        self.repos.attendance().stats(student_id).await
    }

    async fn update(&self, attendance_id: i32, status: &str, recorded_by: i32) -> AppResult<AttendanceEntry> {
        let status: AttendanceStatus = status.parse()?;

        let attendance = self.repos.attendance();
        if attendance.update(attendance_id, status, recorded_by).await? == 0 {
            return Err(AppError::NotFound);
        }

        attendance
            .find_by_id(attendance_id)
            .await?
            .ok_or_not_found()
    }

    async fn delete(&self, attendance_id: i32) -> AppResult<()> {
        if self.repos.attendance().delete(attendance_id).await? == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(attendance_id, "Attendance record deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, ClassSection, Role};
    use crate::infra::{
        MockAccountRepository, MockAttendanceRepository, MockPersistence, MockRosterRepository,
    };
    use chrono::Utc;
    use mockall::predicate::{always, eq};
    use std::sync::Mutex;

    const TEACHER: i32 = 100;
    const CLASS: i32 = 7;

    fn student(id: i32) -> Account {
        Account {
            id,
            display_name: format!("Student {}", id),
            email: format!("s{}@example.com", id),
            role: Role::Student,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn class(class_id: i32) -> ClassSection {
        ClassSection {
            class_id,
            class_name: "Biology".to_string(),
            class_code: "BIO-1".to_string(),
            description: None,
            created_by: 1,
            created_by_name: None,
            created_at: Utc::now(),
        }
    }

    fn stored(student_id: i32, recorded_by: i32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            attendance_id: student_id * 10,
            student_id,
            recorded_by,
            status,
            recorded_at: Utc::now(),
        }
    }

    fn roster_of(students: Vec<i32>) -> MockRosterRepository {
        let mut rosters = MockRosterRepository::new();
        rosters
            .expect_find_class()
            .with(eq(CLASS))
            .returning(|id| Ok(Some(class(id))));
        rosters
            .expect_enrolled_student_ids()
            .with(eq(CLASS))
            .returning(move |_| Ok(students.clone()));
        rosters
    }

    fn manager(
        accounts: MockAccountRepository,
        rosters: MockRosterRepository,
        attendance: MockAttendanceRepository,
    ) -> AttendanceManager<MockPersistence> {
        AttendanceManager::new(Arc::new(MockPersistence::new(accounts, rosters, attendance)))
    }

    /// Attendance store that remembers every insert.
    fn recording_store(log: Arc<Mutex<Vec<(i32, i32, AttendanceStatus)>>>) -> MockAttendanceRepository {
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_create().returning(move |student_id, recorded_by, status| {
            log.lock().unwrap().push((student_id, recorded_by, status));
            Ok(stored(student_id, recorded_by, status))
        });
        attendance
    }

    #[tokio::test]
    async fn test_record_one_accepts_every_status() {
        for status in AttendanceStatus::ALL {
            let mut accounts = MockAccountRepository::new();
            accounts.expect_find_by_id().returning(|id| Ok(Some(student(id))));
            let mut attendance = MockAttendanceRepository::new();
            attendance
                .expect_create()
                .with(eq(5), eq(TEACHER), eq(status))
                .times(1)
                .returning(|s, r, st| Ok(stored(s, r, st)));

            let record = manager(accounts, MockRosterRepository::new(), attendance)
                .record_one(5, TEACHER, status.as_str())
                .await
                .unwrap();
            assert_eq!(record.status, status);
            assert_eq!(record.recorded_by, TEACHER);
        }
    }

    #[tokio::test]
    async fn test_record_one_invalid_status_touches_no_store() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().never();
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_create().never();

        let result = manager(accounts, MockRosterRepository::new(), attendance)
            .record_one(5, TEACHER, "tardy")
            .await;
        assert!(matches!(result, Err(AppError::InvalidStatus(s)) if s == "tardy"));
    }

    #[tokio::test]
    async fn test_record_one_for_non_student_rejected() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().returning(|id| {
            let mut teacher = student(id);
            teacher.role = Role::Teacher;
            Ok(Some(teacher))
        });
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_create().never();

        let result = manager(accounts, MockRosterRepository::new(), attendance)
            .record_one(6, TEACHER, "present")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_record_for_class_empty_map_defaults_all_absent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = manager(
            MockAccountRepository::new(),
            roster_of(vec![1, 2, 3]),
            recording_store(log.clone()),
        );

        let result = service
            .record_for_class(CLASS, TEACHER, HashMap::new())
            .await
            .unwrap();

        assert_eq!(result, BulkResult { total: 3, success_count: 3, error_count: 0 });
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 3);
        assert!(log
            .iter()
            .all(|(_, by, status)| *by == TEACHER && *status == AttendanceStatus::Absent));
    }

    #[tokio::test]
    async fn test_record_for_class_partial_map() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let service = manager(
            MockAccountRepository::new(),
            roster_of(vec![1, 2, 3, 4]),
            recording_store(log.clone()),
        );
        let statuses = HashMap::from([
            (1, "late".to_string()),
            (3, "present".to_string()),
            // Not enrolled; ignored.
            (99, "excused".to_string()),
        ]);

        let result = service
            .record_for_class(CLASS, TEACHER, statuses)
            .await
            .unwrap();

        assert_eq!(result.total, 4);
        assert_eq!(result.success_count, 4);
        let log = log.lock().unwrap();
        let by_student: HashMap<i32, AttendanceStatus> =
            log.iter().map(|(s, _, status)| (*s, *status)).collect();
        assert_eq!(by_student.len(), 4);
        assert_eq!(by_student[&1], AttendanceStatus::Late);
        assert_eq!(by_student[&2], AttendanceStatus::Absent);
        assert_eq!(by_student[&3], AttendanceStatus::Present);
        assert_eq!(by_student[&4], AttendanceStatus::Absent);
        assert!(!by_student.contains_key(&99));
    }

    #[tokio::test]
    async fn test_record_for_class_counts_failures_and_continues() {
        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_create()
            .with(eq(2), always(), always())
            .returning(|_, _, _| Err(AppError::internal("insert failed")));
        attendance
            .expect_create()
            .withf(|student_id, _, _| *student_id != 2)
            .returning(|s, r, st| Ok(stored(s, r, st)));

        let result = manager(MockAccountRepository::new(), roster_of(vec![1, 2, 3]), attendance)
            .record_for_class(CLASS, TEACHER, HashMap::new())
            .await
            .unwrap();

        assert_eq!(result, BulkResult { total: 3, success_count: 2, error_count: 1 });
        assert!(result.is_partial());
    }

    #[tokio::test]
    async fn test_record_for_class_bad_status_rejects_before_insert() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_find_class().never();
        rosters.expect_enrolled_student_ids().never();
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_create().never();

        let statuses = HashMap::from([(1, "present".to_string()), (2, "sick".to_string())]);
        let result = manager(MockAccountRepository::new(), rosters, attendance)
            .record_for_class(CLASS, TEACHER, statuses)
            .await;
        assert!(matches!(result, Err(AppError::InvalidStatus(_))));
    }

    #[tokio::test]
    async fn test_record_for_missing_class_is_not_found() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_find_class().returning(|_| Ok(None));
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_create().never();

        let result = manager(MockAccountRepository::new(), rosters, attendance)
            .record_for_class(CLASS, TEACHER, HashMap::new())
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_missing_record_is_not_found() {
        let mut attendance = MockAttendanceRepository::new();
        attendance
            .expect_update()
            .with(eq(404), eq(AttendanceStatus::Excused), eq(TEACHER))
            .returning(|_, _, _| Ok(0));
        attendance.expect_find_by_id().never();

        let result = manager(MockAccountRepository::new(), MockRosterRepository::new(), attendance)
            .update(404, "excused", TEACHER)
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_missing_record_is_not_found() {
        let mut attendance = MockAttendanceRepository::new();
        attendance.expect_delete().returning(|_| Ok(0));

        let result = manager(MockAccountRepository::new(), MockRosterRepository::new(), attendance)
            .delete(1)
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
