//! Service container - wires every service over one repository provider.

use std::sync::Arc;

use super::{
    AccountManager, AccountService, AttendanceManager, AttendanceService, AuthService,
    Authenticator, ClassManager, ClassService,
};
use crate::config::Config;
use crate::infra::{Persistence, Repositories};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get account service
    fn accounts(&self) -> Arc<dyn AccountService>;

    /// Get class and roster service
    fn classes(&self) -> Arc<dyn ClassService>;

    /// Get attendance service
    fn attendance(&self) -> Arc<dyn AttendanceService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    account_service: Arc<dyn AccountService>,
    class_service: Arc<dyn ClassService>,
    attendance_service: Arc<dyn AttendanceService>,
}

impl Services {
    /// Build every service over a shared repository provider
    pub fn new<R: Repositories + 'static>(repos: Arc<R>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(repos.clone(), config)),
            account_service: Arc::new(AccountManager::new(repos.clone())),
            class_service: Arc::new(ClassManager::new(repos.clone())),
            attendance_service: Arc::new(AttendanceManager::new(repos)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config)
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn accounts(&self) -> Arc<dyn AccountService> {
        self.account_service.clone()
    }

    fn classes(&self) -> Arc<dyn ClassService> {
        self.class_service.clone()
    }

    fn attendance(&self) -> Arc<dyn AttendanceService> {
        self.attendance_service.clone()
    }
}
