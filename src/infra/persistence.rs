//! Store access for the service layer.
//!
//! `Persistence` builds the three stores over one connection pool and hands
//! them out behind trait objects, so services can be driven by mocks.
//!
//! Every store call is its own statement; nothing here opens a transaction.
//! Bulk class recording in particular is a sequence of independent inserts.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    AccountRepository, AccountStore, AttendanceRepository, AttendanceStore, RosterRepository,
    RosterStore,
};

/// Repository provider trait for dependency injection.
pub trait Repositories: Send + Sync {
    /// Identity store
    fn accounts(&self) -> Arc<dyn AccountRepository>;

    /// Roster store
    fn rosters(&self) -> Arc<dyn RosterRepository>;

    /// Attendance store
    fn attendance(&self) -> Arc<dyn AttendanceRepository>;
}

/// Concrete implementation of Repositories
pub struct Persistence {
    accounts: Arc<AccountStore>,
    rosters: Arc<RosterStore>,
    attendance: Arc<AttendanceStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            accounts: Arc::new(AccountStore::new(db.clone())),
            rosters: Arc::new(RosterStore::new(db.clone())),
            attendance: Arc::new(AttendanceStore::new(db)),
        }
    }
}

impl Repositories for Persistence {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    fn rosters(&self) -> Arc<dyn RosterRepository> {
        self.rosters.clone()
    }

    fn attendance(&self) -> Arc<dyn AttendanceRepository> {
        self.attendance.clone()
    }
}

/// Repository provider over mocked stores, for service tests.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockPersistence {
    accounts: Arc<dyn AccountRepository>,
    rosters: Arc<dyn RosterRepository>,
    attendance: Arc<dyn AttendanceRepository>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockPersistence {
    pub fn new(
        accounts: super::repositories::MockAccountRepository,
        rosters: super::repositories::MockRosterRepository,
        attendance: super::repositories::MockAttendanceRepository,
    ) -> Self {
        Self {
            accounts: Arc::new(accounts),
            rosters: Arc::new(rosters),
            attendance: Arc::new(attendance),
        }
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Repositories for MockPersistence {
    fn accounts(&self) -> Arc<dyn AccountRepository> {
        self.accounts.clone()
    }

    fn rosters(&self) -> Arc<dyn RosterRepository> {
        self.rosters.clone()
    }

    fn attendance(&self) -> Arc<dyn AttendanceRepository> {
        self.attendance.clone()
    }
}
