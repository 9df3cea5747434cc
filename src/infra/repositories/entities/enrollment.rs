//! Enrollment (student ↔ class) database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Enrollment;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub class_id: i32,
    pub enrolled_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Enrollment {
    fn from(model: Model) -> Self {
        Enrollment {
            id: model.id,
            student_id: model.student_id,
            class_id: model.class_id,
            enrolled_at: model.enrolled_at,
        }
    }
}
