//! OpenAPI documentation configuration.
//!
//! Served as JSON at `/api-docs/openapi.json` and browsable at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{account_handler, attendance_handler, auth_handler, class_handler};
use crate::domain::{
    AccountResponse, AttendanceEntry, AttendanceRecord, AttendanceStatus, BulkResult,
    ClassSection, EnrolledClass, Enrollment, Role, RosterEntry, StatusCount, StudentSummary,
};
use crate::services::TokenResponse;

/// OpenAPI documentation for the attendance tracker
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker",
        version = "0.1.0",
        description = "Role-based attendance and class-roster tracking API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Accounts
        account_handler::get_profile,
        account_handler::update_profile,
        account_handler::list_accounts,
        account_handler::list_students,
        // Classes and roster
        class_handler::list_classes,
        class_handler::create_class,
        class_handler::my_classes,
        class_handler::get_class,
        class_handler::update_class,
        class_handler::delete_class,
        class_handler::roster,
        class_handler::enroll,
        class_handler::unenroll,
        class_handler::available_students,
        class_handler::class_attendance,
        // Attendance
        attendance_handler::list_all,
        attendance_handler::record_one,
        attendance_handler::record_for_class,
        attendance_handler::recorded_by_me,
        attendance_handler::my_attendance,
        attendance_handler::student_attendance,
        attendance_handler::by_date_range,
        attendance_handler::stats,
        attendance_handler::update_attendance,
        attendance_handler::delete_attendance,
    ),
    components(
        schemas(
            // Domain types
            Role,
            AccountResponse,
            ClassSection,
            Enrollment,
            RosterEntry,
            StudentSummary,
            EnrolledClass,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceEntry,
            StatusCount,
            BulkResult,
            // Request types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            account_handler::UpdateProfileRequest,
            class_handler::ClassRequest,
            class_handler::EnrollRequest,
            attendance_handler::RecordAttendanceRequest,
            attendance_handler::RecordClassAttendanceRequest,
            attendance_handler::UpdateAttendanceRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Accounts", description = "Profiles and account listings"),
        (name = "Classes", description = "Class section management"),
        (name = "Roster", description = "Enrollment of students in classes"),
        (name = "Attendance", description = "Recording and reporting attendance")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
