//! Class sections, enrollments and the roster views built from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Role;

/// A class section, with its creator's display name resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSection {
    #[schema(example = 1)]
    pub class_id: i32,
    #[schema(example = "Algebra I")]
    pub class_name: String,
    #[schema(example = "MATH-101")]
    pub class_code: String,
    pub description: Option<String>,
    pub created_by: i32,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields of a class section to create, or to replace on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDetails {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

/// Enrollment of a student in a class. Unique per (student, class).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Enrollment {
    pub id: i32,
    pub student_id: i32,
    pub class_id: i32,
    pub enrolled_at: DateTime<Utc>,
}

/// One student of a class roster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterEntry {
    pub id: i32,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub enrolled_at: DateTime<Utc>,
}

/// A student not (yet) enrolled in a given class, or any student in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    pub id: i32,
    pub user_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A class the calling student is enrolled in.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrolledClass {
    pub class_id: i32,
    pub class_name: String,
    pub class_code: String,
    pub description: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}
