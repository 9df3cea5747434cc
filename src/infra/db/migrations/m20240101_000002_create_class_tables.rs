//! Migration: Create class sections and enrollments.

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
                    .table(ClassSections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassSections::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ClassSections::Name).string().not_null())
                    .col(ColumnDef::new(ClassSections::Code).string().not_null().unique_key())
                    .col(ColumnDef::new(ClassSections::Description).text().null())
                    .col(ColumnDef::new(ClassSections::CreatedBy).integer().not_null())
                    .col(
                        ColumnDef::new(ClassSections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_sections_created_by")
                            .from(ClassSections::Table, ClassSections::CreatedBy)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Removing a class removes its roster; accounts cannot be deleted.
        manager
            .create_table(
                Table::create()
                    .table(Enrollments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Enrollments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Enrollments::StudentId).integer().not_null())
                    .col(ColumnDef::new(Enrollments::ClassId).integer().not_null())
                    .col(
                        ColumnDef::new(Enrollments::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_student")
                            .from(Enrollments::Table, Enrollments::StudentId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollments_class")
                            .from(Enrollments::Table, Enrollments::ClassId)
                            .to(ClassSections::Table, ClassSections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_student_class")
                    .table(Enrollments::Table)
                    .col(Enrollments::StudentId)
                    .col(Enrollments::ClassId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_enrollments_class")
                    .table(Enrollments::Table)
                    .col(Enrollments::ClassId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Enrollments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClassSections::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ClassSections {
    Table,
    Id,
    Name,
    Code,
    Description,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum Enrollments {
    Table,
    Id,
    StudentId,
    ClassId,
    EnrolledAt,
}
