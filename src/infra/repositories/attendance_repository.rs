//! Attendance store: the append-only log of attendance events.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Select, Set,
};

use super::entities::{
    account::{self, Entity as AccountEntity},
    attendance_record::{self, Entity as AttendanceEntity},
    enrollment::{self, Entity as EnrollmentEntity},
};
use crate::domain::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, DateRange, StatusCount,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Attendance repository trait for dependency injection.
///
/// Every listing is newest first and carries student and recorder names.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Append a new record stamped with the current time
    async fn create(
        &self,
        student_id: i32,
        recorded_by: i32,
        status: AttendanceStatus,
    ) -> AppResult<AttendanceRecord>;

    /// Find a single record by ID
    async fn find_by_id(&self, attendance_id: i32) -> AppResult<Option<AttendanceEntry>>;

    /// Every record
    async fn list_all(&self) -> AppResult<Vec<AttendanceEntry>>;

    /// Records about one student
    async fn list_by_student(&self, student_id: i32) -> AppResult<Vec<AttendanceEntry>>;

    /// Records created or last updated by one account
    async fn list_by_recorder(&self, recorded_by: i32) -> AppResult<Vec<AttendanceEntry>>;

    /// Records about the students currently enrolled in a class
    async fn list_by_class(&self, class_id: i32) -> AppResult<Vec<AttendanceEntry>>;

    /// Records whose UTC date falls inside the range
    async fn list_by_date_range(&self, range: DateRange) -> AppResult<Vec<AttendanceEntry>>;

    /// Rewrite status and recorder, refreshing `recorded_at`; returns rows changed
    async fn update(
        &self,
        attendance_id: i32,
        status: AttendanceStatus,
        recorded_by: i32,
    ) -> AppResult<u64>;

    /// Delete a record; returns rows changed
    async fn delete(&self, attendance_id: i32) -> AppResult<u64>;

    /// Record counts per status, for one student or globally
    async fn stats(&self, student_id: Option<i32>) -> AppResult<Vec<StatusCount>>;
}

#[derive(Debug, FromQueryResult)]
struct StatusCountRow {
    status: String,
    count: i64,
}

/// SeaORM-backed attendance store
pub struct AttendanceStore {
    db: DatabaseConnection,
}

impl AttendanceStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Run a record query and resolve student/recorder display names.
    async fn fetch(&self, query: Select<AttendanceEntity>) -> AppResult<Vec<AttendanceEntry>> {
        let models = query
            .order_by_desc(attendance_record::Column::RecordedAt)
            .order_by_desc(attendance_record::Column::Id)
            .all(&self.db)
            .await?;

        let account_ids: HashSet<i32> = models
            .iter()
            .flat_map(|m| [m.student_id, m.recorded_by])
            .collect();
        let names: HashMap<i32, String> = AccountEntity::find()
            .filter(account::Column::Id.is_in(account_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.display_name))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let record = AttendanceRecord::try_from(model)?;
                Ok(AttendanceEntry {
                    attendance_id: record.attendance_id,
                    student_id: record.student_id,
                    student_name: names.get(&record.student_id).cloned().unwrap_or_default(),
                    recorded_by: record.recorded_by,
                    recorded_by_name: names.get(&record.recorded_by).cloned().unwrap_or_default(),
                    status: record.status,
                    recorded_at: record.recorded_at,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AttendanceRepository for AttendanceStore {
    async fn create(
        &self,
        student_id: i32,
        recorded_by: i32,
        status: AttendanceStatus,
    ) -> AppResult<AttendanceRecord> {
        let active_model = attendance_record::ActiveModel {
            student_id: Set(student_id),
            recorded_by: Set(recorded_by),
            status: Set(status.to_string()),
            recorded_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await.map_err(AppError::from)?;
        tracing::debug!(attendance_id = model.id, student_id, recorded_by, %status, "Attendance recorded");
        AttendanceRecord::try_from(model)
    }

    async fn find_by_id(&self, attendance_id: i32) -> AppResult<Option<AttendanceEntry>> {
        let mut found = self
            .fetch(AttendanceEntity::find_by_id(attendance_id))
            .await?;
        Ok(found.pop())
    }

    async fn list_all(&self) -> AppResult<Vec<AttendanceEntry>> {
        self.fetch(AttendanceEntity::find()).await
    }

    async fn list_by_student(&self, student_id: i32) -> AppResult<Vec<AttendanceEntry>> {
        self.fetch(
            AttendanceEntity::find().filter(attendance_record::Column::StudentId.eq(student_id)),
        )
        .await
    }

    async fn list_by_recorder(&self, recorded_by: i32) -> AppResult<Vec<AttendanceEntry>> {
        self.fetch(
            AttendanceEntity::find().filter(attendance_record::Column::RecordedBy.eq(recorded_by)),
        )
        .await
    }

    async fn list_by_class(&self, class_id: i32) -> AppResult<Vec<AttendanceEntry>> {
        let student_ids: Vec<i32> = EnrollmentEntity::find()
            .filter(enrollment::Column::ClassId.eq(class_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.student_id)
            .collect();

        self.fetch(
            AttendanceEntity::find().filter(attendance_record::Column::StudentId.is_in(student_ids)),
        )
        .await
    }

    async fn list_by_date_range(&self, range: DateRange) -> AppResult<Vec<AttendanceEntry>> {
        self.fetch(
            AttendanceEntity::find()
                .filter(attendance_record::Column::RecordedAt.gte(range.lower_bound()))
                .filter(attendance_record::Column::RecordedAt.lt(range.upper_bound())),
        )
        .await
    }

    async fn update(
        &self,
        attendance_id: i32,
        status: AttendanceStatus,
        recorded_by: i32,
    ) -> AppResult<u64> {
        let result = AttendanceEntity::update_many()
            .col_expr(attendance_record::Column::Status, status.as_str().into())
            .col_expr(attendance_record::Column::RecordedBy, recorded_by.into())
            .col_expr(attendance_record::Column::RecordedAt, chrono::Utc::now().into())
            .filter(attendance_record::Column::Id.eq(attendance_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn delete(&self, attendance_id: i32) -> AppResult<u64> {
        let result = AttendanceEntity::delete_by_id(attendance_id)
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn stats(&self, student_id: Option<i32>) -> AppResult<Vec<StatusCount>> {
        let mut query = AttendanceEntity::find()
            .select_only()
            .column(attendance_record::Column::Status)
            .column_as(attendance_record::Column::Id.count(), "count")
            .group_by(attendance_record::Column::Status)
            .order_by_asc(attendance_record::Column::Status);

        if let Some(student_id) = student_id {
            query = query.filter(attendance_record::Column::StudentId.eq(student_id));
        }

        let rows = query
            .into_model::<StatusCountRow>()
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(StatusCount {
                    status: row.status.parse()?,
                    count: row.count,
                })
            })
            .collect()
    }
}
