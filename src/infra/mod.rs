//! Infrastructure layer - Database connection, migrations and stores.

pub mod db;
pub mod persistence;
pub mod repositories;

pub use db::{Database, Migrator};
pub use persistence::{Persistence, Repositories};
pub use repositories::{
    AccountRepository, AccountStore, AttendanceRepository, AttendanceStore, RosterRepository,
    RosterStore,
};

#[cfg(any(test, feature = "test-utils"))]
pub use persistence::MockPersistence;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAccountRepository, MockAttendanceRepository, MockRosterRepository};
