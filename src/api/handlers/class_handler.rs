//! Class section and roster handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authorize, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    AttendanceEntry, ClassDetails, ClassSection, EnrolledClass, Enrollment, Operation, RosterEntry,
    StudentSummary,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

/// Create or replace a class section
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClassRequest {
    #[validate(length(min = 1, message = "Class name is required"))]
    #[schema(example = "Algebra I")]
    pub class_name: String,
    #[validate(length(min = 1, message = "Class code is required"))]
    #[schema(example = "MATH-101")]
    pub class_code: String,
    #[schema(example = "Linear equations and inequalities")]
    pub description: Option<String>,
}

impl From<ClassRequest> for ClassDetails {
    fn from(request: ClassRequest) -> Self {
        Self {
            name: request.class_name,
            code: request.class_code,
            description: request.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Enroll a student in a class
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnrollRequest {
    #[validate(range(min = 1, message = "Invalid student id"))]
    #[schema(example = 3)]
    pub student_id: i32,
}

pub fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route("/my-classes", get(my_classes))
        .route("/:id", get(get_class).put(update_class).delete(delete_class))
        .route("/:id/students", get(roster).post(enroll))
        .route("/:id/students/:student_id", delete(unenroll))
        .route("/:id/available-students", get(available_students))
        .route("/:id/attendance", get(class_attendance))
}

/// List all classes ordered by name
#[utoipa::path(
    get,
    path = "/classes",
    tag = "Classes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All classes", body = Vec<ClassSection>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_classes(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<ClassSection>>>> {
    authorize(&current_user, Operation::ReadClasses)?;

    let classes = state.class_service.list_classes().await?;
    Ok(Json(ApiResponse::success(classes)))
}

/// Create a class (admin only)
#[utoipa::path(
    post,
    path = "/classes",
    tag = "Classes",
    security(("bearer_auth" = [])),
    request_body = ClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassSection),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Class code already in use")
    )
)]
pub async fn create_class(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ClassRequest>,
) -> AppResult<Created<ClassSection>> {
    authorize(&current_user, Operation::ManageClass)?;

    let class = state
        .class_service
        .create_class(payload.into(), current_user.id)
        .await?;
    Ok(Created(class))
}

/// Classes the calling student is enrolled in
#[utoipa::path(
    get,
    path = "/classes/my-classes",
    tag = "Classes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrolled classes", body = Vec<EnrolledClass>),
        (status = 403, description = "Caller is not a student")
    )
)]
pub async fn my_classes(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<EnrolledClass>>>> {
    authorize(&current_user, Operation::ReadMyClasses)?;

    let classes = state
        .class_service
        .classes_for_student(current_user.id)
        .await?;
    Ok(Json(ApiResponse::success(classes)))
}

/// Get a class by ID
#[utoipa::path(
    get,
    path = "/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class found", body = ClassSection),
        (status = 404, description = "Class not found")
    )
)]
pub async fn get_class(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ClassSection>>> {
    authorize(&current_user, Operation::ReadClasses)?;

    let class = state.class_service.get_class(id).await?;
    Ok(Json(ApiResponse::success(class)))
}

/// Replace a class's name, code and description (admin only)
#[utoipa::path(
    put,
    path = "/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    request_body = ClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ClassSection),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class code already in use")
    )
)]
pub async fn update_class(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ClassRequest>,
) -> AppResult<Json<ApiResponse<ClassSection>>> {
    authorize(&current_user, Operation::ManageClass)?;

    let class = state.class_service.update_class(id, payload.into()).await?;
    Ok(Json(ApiResponse::with_message(class, "Class updated")))
}

/// Delete a class and its enrollments (admin only)
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    tag = "Classes",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    authorize(&current_user, Operation::ManageClass)?;

    state.class_service.delete_class(id).await?;
    Ok(NoContent)
}

/// Students enrolled in a class
#[utoipa::path(
    get,
    path = "/classes/{id}/students",
    tag = "Roster",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class roster", body = Vec<RosterEntry>),
        (status = 404, description = "Class not found")
    )
)]
pub async fn roster(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<RosterEntry>>>> {
    authorize(&current_user, Operation::ReadRoster)?;

    let roster = state.class_service.roster(id).await?;
    Ok(Json(ApiResponse::success(roster)))
}

/// Enroll a student (admin only)
#[utoipa::path(
    post,
    path = "/classes/{id}/students",
    tag = "Roster",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Student enrolled", body = Enrollment),
        (status = 400, description = "Account is not a student"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class or student not found"),
        (status = 409, description = "Student already enrolled")
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<EnrollRequest>,
) -> AppResult<Created<Enrollment>> {
    authorize(&current_user, Operation::ManageEnrollment)?;

    let enrollment = state.class_service.enroll(id, payload.student_id).await?;
    Ok(Created(enrollment))
}

/// Remove a student from a class (admin only)
#[utoipa::path(
    delete,
    path = "/classes/{id}/students/{student_id}",
    tag = "Roster",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Class ID"),
        ("student_id" = i32, Path, description = "Student account ID")
    ),
    responses(
        (status = 204, description = "Student removed"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Enrollment not found")
    )
)]
pub async fn unenroll(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, student_id)): Path<(i32, i32)>,
) -> AppResult<NoContent> {
    authorize(&current_user, Operation::ManageEnrollment)?;

    state.class_service.unenroll(id, student_id).await?;
    Ok(NoContent)
}

/// Students not yet enrolled in a class (admin only)
#[utoipa::path(
    get,
    path = "/classes/{id}/available-students",
    tag = "Roster",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Roster complement", body = Vec<StudentSummary>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn available_students(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<StudentSummary>>>> {
    authorize(&current_user, Operation::ReadAvailableStudents)?;

    let students = state.class_service.available_students(id).await?;
    Ok(Json(ApiResponse::success(students)))
}

/// Attendance of the students currently enrolled in a class
#[utoipa::path(
    get,
    path = "/classes/{id}/attendance",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class attendance", body = Vec<AttendanceEntry>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn class_attendance(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(&current_user, Operation::ReadClassAttendance)?;

    let records = state.attendance_service.list_for_class(id).await?;
    Ok(Json(ApiResponse::success(records)))
}
