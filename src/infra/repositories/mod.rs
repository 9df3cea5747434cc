//! Repository layer - Data access abstraction
//!
//! One store per aggregate: identity (accounts), roster (classes and
//! enrollments) and attendance. Each store wraps the shared connection pool.

mod account_repository;
mod attendance_repository;
pub(crate) mod entities;
mod roster_repository;

pub use account_repository::{AccountRepository, AccountStore};
pub use attendance_repository::{AttendanceRepository, AttendanceStore};
pub use roster_repository::{RosterRepository, RosterStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_repository::MockAccountRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use attendance_repository::MockAttendanceRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use roster_repository::MockRosterRepository;
