//! HTTP request handlers.

pub mod account_handler;
pub mod attendance_handler;
pub mod auth_handler;
pub mod class_handler;

pub use account_handler::{account_routes, profile_routes};
pub use attendance_handler::attendance_routes;
pub use auth_handler::auth_routes;
pub use class_handler::class_routes;
