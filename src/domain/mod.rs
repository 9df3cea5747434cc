//! Domain layer - Core business entities and logic
//!
//! Accounts, class sections with their enrollments, attendance events and
//! the authorization policy that guards them. Nothing here touches storage.

pub mod account;
pub mod attendance;
pub mod class_section;
pub mod password;
pub mod policy;

pub use account::{Account, AccountResponse, NewAccount, Role};
pub use attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, BulkResult, DateRange, StatusCount,
};
pub use class_section::{
    ClassDetails, ClassSection, EnrolledClass, Enrollment, RosterEntry, StudentSummary,
};
pub use password::Password;
pub use policy::{decide, stats_scope, Caller, Decision, Operation};
