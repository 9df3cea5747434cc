//! Class service - class sections and their rosters.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{ClassDetails, ClassSection, EnrolledClass, Enrollment, RosterEntry, StudentSummary};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::Repositories;

/// Class service trait for dependency injection.
#[async_trait]
pub trait ClassService: Send + Sync {
    async fn create_class(&self, details: ClassDetails, created_by: i32) -> AppResult<ClassSection>;

    async fn list_classes(&self) -> AppResult<Vec<ClassSection>>;

    async fn get_class(&self, class_id: i32) -> AppResult<ClassSection>;

    /// Replace name, code and description; returns the refreshed class
    async fn update_class(&self, class_id: i32, details: ClassDetails) -> AppResult<ClassSection>;

    /// Delete a class together with its enrollments
    async fn delete_class(&self, class_id: i32) -> AppResult<()>;

    /// Enroll a student account in an existing class
    async fn enroll(&self, class_id: i32, student_id: i32) -> AppResult<Enrollment>;

    async fn unenroll(&self, class_id: i32, student_id: i32) -> AppResult<()>;

    async fn roster(&self, class_id: i32) -> AppResult<Vec<RosterEntry>>;

    /// Students not yet enrolled in the class
    async fn available_students(&self, class_id: i32) -> AppResult<Vec<StudentSummary>>;

    async fn classes_for_student(&self, student_id: i32) -> AppResult<Vec<EnrolledClass>>;
}

/// Concrete implementation of ClassService.
pub struct ClassManager<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> ClassManager<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }

    async fn require_class(&self, class_id: i32) -> AppResult<ClassSection> {
        self.repos
            .rosters()
            .find_class(class_id)
            .await?
            .ok_or_not_found()
    }
}

#[async_trait]
impl<R: Repositories> ClassService for ClassManager<R> {
    async fn create_class(&self, details: ClassDetails, created_by: i32) -> AppResult<ClassSection> {
        self.repos.rosters().create_class(details, created_by).await
    }

    async fn list_classes(&self) -> AppResult<Vec<ClassSection>> {
        self.repos.rosters().list_classes().await
    }

    async fn get_class(&self, class_id: i32) -> AppResult<ClassSection> {
        self.require_class(class_id).await
    }

    async fn update_class(&self, class_id: i32, details: ClassDetails) -> AppResult<ClassSection> {
        if self.repos.rosters().update_class(class_id, details).await? == 0 {
            return Err(AppError::NotFound);
        }
        self.require_class(class_id).await
    }

    async fn delete_class(&self, class_id: i32) -> AppResult<()> {
        if self.repos.rosters().delete_class(class_id).await? == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(class_id, "Class deleted");
        Ok(())
    }

    async fn enroll(&self, class_id: i32, student_id: i32) -> AppResult<Enrollment> {
        self.require_class(class_id).await?;

        let student = self
            .repos
            .accounts()
            .find_by_id(student_id)
            .await?
            .ok_or_not_found()?;
        if !student.is_student() {
            return Err(AppError::validation("Only student accounts can be enrolled"));
        }

        self.repos.rosters().enroll(student_id, class_id).await
    }

    async fn unenroll(&self, class_id: i32, student_id: i32) -> AppResult<()> {
        if self.repos.rosters().unenroll(student_id, class_id).await? == 0 {
            return Err(AppError::NotFound);
        }
        tracing::info!(student_id, class_id, "Student unenrolled");
        Ok(())
    }

    async fn roster(&self, class_id: i32) -> AppResult<Vec<RosterEntry>> {
        self.require_class(class_id).await?;
        self.repos.rosters().roster(class_id).await
    }

    async fn available_students(&self, class_id: i32) -> AppResult<Vec<StudentSummary>> {
        self.require_class(class_id).await?;
        self.repos.rosters().available_students(class_id).await
    }

    async fn classes_for_student(&self, student_id: i32) -> AppResult<Vec<EnrolledClass>> {
        self.repos.rosters().classes_for_student(student_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, Role};
    use crate::infra::{
        MockAccountRepository, MockAttendanceRepository, MockPersistence, MockRosterRepository,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn class(class_id: i32) -> ClassSection {
        ClassSection {
            class_id,
            class_name: "Algebra".to_string(),
            class_code: "MATH-1".to_string(),
            description: None,
            created_by: 1,
            created_by_name: Some("Admin".to_string()),
            created_at: Utc::now(),
        }
    }

    fn account(id: i32, role: Role) -> Account {
        Account {
            id,
            display_name: "Someone".to_string(),
            email: format!("{}@example.com", id),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn manager(accounts: MockAccountRepository, rosters: MockRosterRepository) -> ClassManager<MockPersistence> {
        ClassManager::new(Arc::new(MockPersistence::new(
            accounts,
            rosters,
            MockAttendanceRepository::new(),
        )))
    }

    #[tokio::test]
    async fn test_enroll_rejects_non_student() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_find_class().returning(|id| Ok(Some(class(id))));
        rosters.expect_enroll().never();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .with(eq(2))
            .returning(|id| Ok(Some(account(id, Role::Teacher))));

        let result = manager(accounts, rosters).enroll(10, 2).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_enroll_into_missing_class_is_not_found() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_find_class().returning(|_| Ok(None));
        rosters.expect_enroll().never();

        let result = manager(MockAccountRepository::new(), rosters).enroll(99, 3).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_enrollment_conflict_propagates() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_find_class().returning(|id| Ok(Some(class(id))));
        rosters
            .expect_enroll()
            .with(eq(3), eq(10))
            .returning(|_, _| Err(AppError::conflict("Enrollment")));
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_id()
            .returning(|id| Ok(Some(account(id, Role::Student))));

        let result = manager(accounts, rosters).enroll(10, 3).await;
        assert!(matches!(result, Err(AppError::Conflict(name)) if name == "Enrollment"));
    }

    #[tokio::test]
    async fn test_update_missing_class_is_not_found() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_update_class().returning(|_, _| Ok(0));
        rosters.expect_find_class().never();

        let details = ClassDetails {
            name: "Gone".to_string(),
            code: "GONE-1".to_string(),
            description: None,
        };
        let result = manager(MockAccountRepository::new(), rosters)
            .update_class(7, details)
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_unenroll_absent_pair_is_not_found() {
        let mut rosters = MockRosterRepository::new();
        rosters.expect_unenroll().with(eq(3), eq(10)).returning(|_, _| Ok(0));

        let result = manager(MockAccountRepository::new(), rosters).unenroll(10, 3).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
