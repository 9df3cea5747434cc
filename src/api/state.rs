//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AccountService, AttendanceService, AuthService, ClassService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// Account and profile service
    pub account_service: Arc<dyn AccountService>,
    /// Class and roster service
    pub class_service: Arc<dyn ClassService>,
    /// Attendance service
    pub attendance_service: Arc<dyn AttendanceService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Allowed CORS origin for the browser client
    pub cors_allowed_origin: String,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let cors_allowed_origin = config.cors_allowed_origin.clone();
        let container = Services::from_connection(database.get_connection(), config);
        Self::from_container(&container, database, cors_allowed_origin)
    }

    /// Create application state from any service container.
    pub fn from_container(
        container: &dyn ServiceContainer,
        database: Arc<Database>,
        cors_allowed_origin: String,
    ) -> Self {
        Self {
            auth_service: container.auth(),
            account_service: container.accounts(),
            class_service: container.classes(),
            attendance_service: container.attendance(),
            database,
            cors_allowed_origin,
        }
    }
}
