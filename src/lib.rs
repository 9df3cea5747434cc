//! Attendance tracker - role-based attendance and class-roster API.
//!
//! Admins manage class sections and their rosters, teachers and admins
//! record attendance, and students read their own records. Every request is
//! checked against a single policy table in [`domain::policy`] before any
//! store is touched.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points (`serve`, `migrate`)
//! - **config**: environment configuration and constants
//! - **domain**: accounts, classes, attendance and the access policy
//! - **services**: use cases over the store traits
//! - **infra**: SeaORM entities, migrations and stores
//! - **api**: HTTP handlers, middleware and routes
//! - **types**: response envelopes
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Show migration status
//! cargo run -- migrate status
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use config::Config;
pub use domain::{AttendanceStatus, Password, Role};
pub use errors::{AppError, AppResult};
pub use infra::Database;
