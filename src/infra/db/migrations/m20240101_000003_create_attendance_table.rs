//! Migration: Create attendance records table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_accounts_table::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AttendanceRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AttendanceRecords::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AttendanceRecords::StudentId).integer().not_null())
                    .col(ColumnDef::new(AttendanceRecords::RecordedBy).integer().not_null())
                    .col(
                        ColumnDef::new(AttendanceRecords::Status)
                            .string()
                            .not_null()
                            .check(
                                Expr::col(AttendanceRecords::Status)
                                    .is_in(["present", "absent", "late", "excused"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(AttendanceRecords::RecordedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_student")
                            .from(AttendanceRecords::Table, AttendanceRecords::StudentId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attendance_recorded_by")
                            .from(AttendanceRecords::Table, AttendanceRecords::RecordedBy)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_attendance_student", AttendanceRecords::StudentId),
            ("idx_attendance_recorded_by", AttendanceRecords::RecordedBy),
            ("idx_attendance_recorded_at", AttendanceRecords::RecordedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(AttendanceRecords::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AttendanceRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AttendanceRecords {
    Table,
    Id,
    StudentId,
    RecordedBy,
    Status,
    RecordedAt,
}
