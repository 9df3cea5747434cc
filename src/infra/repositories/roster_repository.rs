//! Roster store: class sections and the student ↔ class enrollment relation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{
    account::{self, Entity as AccountEntity},
    class_section::{self, Entity as ClassEntity},
    enrollment::{self, Entity as EnrollmentEntity},
};
use crate::domain::{
    ClassDetails, ClassSection, EnrolledClass, Enrollment, Role, RosterEntry, StudentSummary,
};
use crate::errors::{conflict_on_unique, AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Roster repository trait for dependency injection.
///
/// Mutations report the number of rows changed; zero means the target did
/// not exist.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Create a class section
    async fn create_class(&self, details: ClassDetails, created_by: i32) -> AppResult<ClassSection>;

    /// Find class section by ID
    async fn find_class(&self, class_id: i32) -> AppResult<Option<ClassSection>>;

    /// List all class sections ordered by name
    async fn list_classes(&self) -> AppResult<Vec<ClassSection>>;

    /// Replace name, code and description of a class
    async fn update_class(&self, class_id: i32, details: ClassDetails) -> AppResult<u64>;

    /// Delete a class (its enrollments go with it)
    async fn delete_class(&self, class_id: i32) -> AppResult<u64>;

    /// Enroll a student; a duplicate pair is a conflict
    async fn enroll(&self, student_id: i32, class_id: i32) -> AppResult<Enrollment>;

    /// Remove an enrollment
    async fn unenroll(&self, student_id: i32, class_id: i32) -> AppResult<u64>;

    /// IDs of every account enrolled in a class, in enrollment order
    async fn enrolled_student_ids(&self, class_id: i32) -> AppResult<Vec<i32>>;

    /// Students enrolled in a class, ordered by name
    async fn roster(&self, class_id: i32) -> AppResult<Vec<RosterEntry>>;

    /// Students not enrolled in a class, ordered by name
    async fn available_students(&self, class_id: i32) -> AppResult<Vec<StudentSummary>>;

    /// Classes a student is enrolled in, ordered by class name
    async fn classes_for_student(&self, student_id: i32) -> AppResult<Vec<EnrolledClass>>;
}

/// SeaORM-backed roster store
pub struct RosterStore {
    db: DatabaseConnection,
}

impl RosterStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Attach creator display names to class rows.
    async fn with_creators(&self, models: Vec<class_section::Model>) -> AppResult<Vec<ClassSection>> {
        let creator_ids: Vec<i32> = models.iter().map(|m| m.created_by).collect();
        let names: HashMap<i32, String> = AccountEntity::find()
            .filter(account::Column::Id.is_in(creator_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.display_name))
            .collect();

        Ok(models
            .into_iter()
            .map(|m| ClassSection {
                created_by_name: names.get(&m.created_by).cloned(),
                class_id: m.id,
                class_name: m.name,
                class_code: m.code,
                description: m.description,
                created_by: m.created_by,
                created_at: m.created_at,
            })
            .collect())
    }
}

#[async_trait]
impl RosterRepository for RosterStore {
    async fn create_class(&self, details: ClassDetails, created_by: i32) -> AppResult<ClassSection> {
        let active_model = class_section::ActiveModel {
            name: Set(details.name),
            code: Set(details.code),
            description: Set(details.description),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(conflict_on_unique("Class code"))?;

        tracing::info!(class_id = model.id, code = %model.code, "Class created");
        let mut created = self.with_creators(vec![model]).await?;
        created
            .pop()
            .ok_or_else(|| AppError::internal("created class vanished"))
    }

    async fn find_class(&self, class_id: i32) -> AppResult<Option<ClassSection>> {
        let model = ClassEntity::find_by_id(class_id).one(&self.db).await?;
        match model {
            Some(model) => Ok(self.with_creators(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_classes(&self) -> AppResult<Vec<ClassSection>> {
        let models = ClassEntity::find()
            .order_by_asc(class_section::Column::Name)
            .all(&self.db)
            .await?;

        self.with_creators(models).await
    }

    async fn update_class(&self, class_id: i32, details: ClassDetails) -> AppResult<u64> {
        let result = ClassEntity::update_many()
            .col_expr(class_section::Column::Name, details.name.into())
            .col_expr(class_section::Column::Code, details.code.into())
            .col_expr(class_section::Column::Description, details.description.into())
            .filter(class_section::Column::Id.eq(class_id))
            .exec(&self.db)
            .await
            .map_err(conflict_on_unique("Class code"))?;

        Ok(result.rows_affected)
    }

    async fn delete_class(&self, class_id: i32) -> AppResult<u64> {
        // Explicit so backends without FK enforcement behave the same.
        EnrollmentEntity::delete_many()
            .filter(enrollment::Column::ClassId.eq(class_id))
            .exec(&self.db)
            .await?;

        let result = ClassEntity::delete_by_id(class_id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }

    async fn enroll(&self, student_id: i32, class_id: i32) -> AppResult<Enrollment> {
        let active_model = enrollment::ActiveModel {
            student_id: Set(student_id),
            class_id: Set(class_id),
            enrolled_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(conflict_on_unique("Enrollment"))?;

        tracing::info!(student_id, class_id, "Student enrolled");
        Ok(Enrollment::from(model))
    }

    async fn unenroll(&self, student_id: i32, class_id: i32) -> AppResult<u64> {
        let result = EnrollmentEntity::delete_many()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .filter(enrollment::Column::ClassId.eq(class_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn enrolled_student_ids(&self, class_id: i32) -> AppResult<Vec<i32>> {
        let models = EnrollmentEntity::find()
            .filter(enrollment::Column::ClassId.eq(class_id))
            .order_by_asc(enrollment::Column::Id)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|m| m.student_id).collect())
    }

    async fn roster(&self, class_id: i32) -> AppResult<Vec<RosterEntry>> {
        let enrolled_at: HashMap<i32, _> = EnrollmentEntity::find()
            .filter(enrollment::Column::ClassId.eq(class_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.student_id, m.enrolled_at))
            .collect();

        let students = AccountEntity::find()
            .filter(account::Column::Id.is_in(enrolled_at.keys().copied()))
            .filter(account::Column::Role.eq(Role::Student.as_str()))
            .order_by_asc(account::Column::DisplayName)
            .all(&self.db)
            .await?;

        Ok(students
            .into_iter()
            .filter_map(|a| {
                enrolled_at.get(&a.id).map(|at| RosterEntry {
                    id: a.id,
                    user_name: a.display_name,
                    email: a.email,
                    role: Role::from(a.role.as_str()),
                    enrolled_at: *at,
                })
            })
            .collect())
    }

    async fn available_students(&self, class_id: i32) -> AppResult<Vec<StudentSummary>> {
        let enrolled = self.enrolled_student_ids(class_id).await?;

        let students = AccountEntity::find()
            .filter(account::Column::Role.eq(Role::Student.as_str()))
            .filter(account::Column::Id.is_not_in(enrolled))
            .order_by_asc(account::Column::DisplayName)
            .all(&self.db)
            .await?;

        Ok(students
            .into_iter()
            .map(|a| StudentSummary {
                id: a.id,
                user_name: a.display_name,
                email: a.email,
                created_at: a.created_at,
            })
            .collect())
    }

    async fn classes_for_student(&self, student_id: i32) -> AppResult<Vec<EnrolledClass>> {
        let enrolled_at: HashMap<i32, _> = EnrollmentEntity::find()
            .filter(enrollment::Column::StudentId.eq(student_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| (m.class_id, m.enrolled_at))
            .collect();

        let classes = ClassEntity::find()
            .filter(class_section::Column::Id.is_in(enrolled_at.keys().copied()))
            .order_by_asc(class_section::Column::Name)
            .all(&self.db)
            .await?;

        Ok(classes
            .into_iter()
            .filter_map(|c| {
                enrolled_at.get(&c.id).map(|at| EnrolledClass {
                    class_id: c.id,
                    class_name: c.name,
                    class_code: c.code,
                    description: c.description,
                    enrolled_at: *at,
                })
            })
            .collect())
    }
}
