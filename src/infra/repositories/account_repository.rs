//! Identity store: accounts and their credentials.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use crate::domain::{Account, NewAccount, Role};
use crate::errors::{conflict_on_unique, AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
///
/// Accounts are never deleted and their role never changes; the only
/// mutation after creation is the profile update.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>>;

    /// Find account by email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Create a new account
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    /// Update display name and email; returns the number of rows changed
    async fn update_profile(&self, id: i32, display_name: String, email: String) -> AppResult<u64>;

    /// List all accounts ordered by display name
    async fn list(&self) -> AppResult<Vec<Account>>;

    /// List accounts holding `role`, ordered by display name
    async fn list_by_role(&self, role: Role) -> AppResult<Vec<Account>>;
}

/// SeaORM-backed identity store
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        let active_model = ActiveModel {
            display_name: Set(account.display_name),
            email: Set(account.email),
            role: Set(account.role.to_string()),
            password_hash: Set(account.password_hash),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(conflict_on_unique("Account email"))?;

        tracing::info!(account_id = model.id, role = %model.role, "Account created");
        Ok(Account::from(model))
    }

    async fn update_profile(&self, id: i32, display_name: String, email: String) -> AppResult<u64> {
        let result = AccountEntity::update_many()
            .col_expr(account::Column::DisplayName, display_name.into())
            .col_expr(account::Column::Email, email.into())
            .filter(account::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(conflict_on_unique("Account email"))?;

        Ok(result.rows_affected)
    }

    async fn list(&self) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .order_by_asc(account::Column::DisplayName)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Account::from).collect())
    }

    async fn list_by_role(&self, role: Role) -> AppResult<Vec<Account>> {
        let models = AccountEntity::find()
            .filter(account::Column::Role.eq(role.as_str()))
            .order_by_asc(account::Column::DisplayName)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Account::from).collect())
    }
}
