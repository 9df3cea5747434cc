//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod account;
pub mod attendance_record;
pub mod class_section;
pub mod enrollment;
