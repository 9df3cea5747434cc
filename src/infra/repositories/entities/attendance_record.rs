//! Attendance record database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::AttendanceRecord;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub recorded_by: i32,
    pub status: String,
    pub recorded_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// The status column is CHECK-constrained, so a parse failure means the
/// store was written around the application.
impl TryFrom<Model> for AttendanceRecord {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            attendance_id: model.id,
            student_id: model.student_id,
            recorded_by: model.recorded_by,
            status: model.status.parse().map_err(|_| {
                AppError::internal(format!(
                    "attendance record {} has unknown status {:?}",
                    model.id, model.status
                ))
            })?,
            recorded_at: model.recorded_at,
        })
    }
}
