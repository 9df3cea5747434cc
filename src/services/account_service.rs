//! Account service - profile reads and updates, account listings.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Account, Role};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::Repositories;

/// Account service trait for dependency injection.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Get account by ID
    async fn get_profile(&self, id: i32) -> AppResult<Account>;

    /// Replace display name and email of an account
    async fn update_profile(&self, id: i32, display_name: String, email: String) -> AppResult<Account>;

    /// List every account
    async fn list_accounts(&self) -> AppResult<Vec<Account>>;

    /// List accounts with the student role
    async fn list_students(&self) -> AppResult<Vec<Account>>;
}

/// Concrete implementation of AccountService.
pub struct AccountManager<R: Repositories> {
    repos: Arc<R>,
}

impl<R: Repositories> AccountManager<R> {
    pub fn new(repos: Arc<R>) -> Self {
        Self { repos }
    }
}

#[async_trait]
impl<R: Repositories> AccountService for AccountManager<R> {
    async fn get_profile(&self, id: i32) -> AppResult<Account> {
        self.repos
            .accounts()
            .find_by_id(id)
            .await?
            .ok_or_not_found()
    }

    async fn update_profile(&self, id: i32, display_name: String, email: String) -> AppResult<Account> {
        let accounts = self.repos.accounts();
        if let Some(holder) = accounts.find_by_email(&email).await? {
            if holder.id != id {
                return Err(AppError::conflict("Account email"));
            }
        }

        if accounts.update_profile(id, display_name, email).await? == 0 {
            return Err(AppError::NotFound);
        }

        accounts.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        self.repos.accounts().list().await
    }

    async fn list_students(&self) -> AppResult<Vec<Account>> {
        self.repos.accounts().list_by_role(Role::Student).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        MockAccountRepository, MockAttendanceRepository, MockPersistence, MockRosterRepository,
    };
    use chrono::Utc;
    use mockall::predicate::eq;

    fn account(id: i32, email: &str) -> Account {
        Account {
            id,
            display_name: format!("Account {}", id),
            email: email.to_string(),
            role: Role::Student,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    fn manager(accounts: MockAccountRepository) -> AccountManager<MockPersistence> {
        AccountManager::new(Arc::new(MockPersistence::new(
            accounts,
            MockRosterRepository::new(),
            MockAttendanceRepository::new(),
        )))
    }

    #[tokio::test]
    async fn test_get_missing_profile_is_not_found() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_id().with(eq(42)).returning(|_| Ok(None));

        let result = manager(accounts).get_profile(42).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_to_email_held_by_other_account_conflicts() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .returning(|email| Ok(Some(account(2, email))));
        accounts.expect_update_profile().never();

        let result = manager(accounts)
            .update_profile(1, "New".to_string(), "taken@example.com".to_string())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_zero_rows_is_not_found() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().returning(|_| Ok(None));
        accounts.expect_update_profile().returning(|_, _, _| Ok(0));
        accounts.expect_find_by_id().never();

        let result = manager(accounts)
            .update_profile(5, "Ghost".to_string(), "ghost@example.com".to_string())
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn test_update_keeping_own_email_succeeds() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .returning(|email| Ok(Some(account(1, email))));
        accounts
            .expect_update_profile()
            .with(eq(1), eq("Renamed".to_string()), eq("me@example.com".to_string()))
            .returning(|_, _, _| Ok(1));
        accounts.expect_find_by_id().returning(|id| {
            let mut updated = account(id, "me@example.com");
            updated.display_name = "Renamed".to_string();
            Ok(Some(updated))
        });

        let updated = manager(accounts)
            .update_profile(1, "Renamed".to_string(), "me@example.com".to_string())
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Renamed");
    }

    #[tokio::test]
    async fn test_list_students_filters_by_role() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_list_by_role()
            .with(eq(Role::Student))
            .returning(|_| Ok(vec![account(4, "s@example.com")]));

        let students = manager(accounts).list_students().await.unwrap();
        assert_eq!(students.len(), 1);
    }
}
