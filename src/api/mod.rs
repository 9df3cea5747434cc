//! API layer - axum router over the attendance services.
//!
//! Handlers resolve the caller from the bearer token, check the access
//! policy, then delegate to a service.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
