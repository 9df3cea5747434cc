//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and the stores to fulfil the
//! application use cases. They depend on the `Repositories` provider trait,
//! so every service can be driven by mocked stores in tests.
//!
//! Authorization is not decided here: handlers consult the domain policy
//! before calling a service, and pass the caller's id wherever it is bound
//! into stored data.

mod account_service;
mod attendance_service;
mod auth_service;
mod class_service;
pub mod container;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use attendance_service::{AttendanceManager, AttendanceService};
pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use class_service::{ClassManager, ClassService};
