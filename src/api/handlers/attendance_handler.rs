//! Attendance handlers.
//!
//! The recorder is always the authenticated caller; request bodies carry no
//! `recorded_by` field.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::{authorize, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    stats_scope, AttendanceEntry, AttendanceRecord, BulkResult, DateRange, Operation, StatusCount,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, NoContent};

/// Record one student's attendance
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceRequest {
    #[validate(range(min = 1, message = "Invalid student id"))]
    #[schema(example = 3)]
    pub student_id: i32,
    /// One of present, absent, late, excused
    #[schema(example = "present")]
    pub status: String,
}

/// Record attendance for every enrolled student of a class
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordClassAttendanceRequest {
    #[validate(range(min = 1, message = "Invalid class id"))]
    #[schema(example = 1)]
    pub class_id: i32,
    /// Status per student id; enrolled students not listed are recorded absent
    #[serde(default)]
    #[schema(value_type = Object, example = json!({"3": "late"}))]
    pub statuses: HashMap<i32, String>,
}

/// Correct the status of an existing record
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceRequest {
    #[schema(example = "excused")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// First day, inclusive (YYYY-MM-DD)
    pub start: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// Restrict counts to one student; omitted means all records
    pub student_id: Option<i32>,
}

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(record_one))
        .route("/class", post(record_for_class))
        .route("/recorded-by-me", get(recorded_by_me))
        .route("/my-attendance", get(my_attendance))
        .route("/student/:id", get(student_attendance))
        .route("/range", get(by_date_range))
        .route("/stats", get(stats))
        .route("/:id", put(update_attendance).delete(delete_attendance))
}

/// Every attendance record (admin only)
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All records, newest first", body = Vec<AttendanceEntry>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(&current_user, Operation::ReadAllAttendance)?;

    let records = state.attendance_service.list_all().await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Record one student's attendance (teacher or admin)
#[utoipa::path(
    post,
    path = "/attendance",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    request_body = RecordAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceRecord),
        (status = 400, description = "Invalid status or target is not a student"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn record_one(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<RecordAttendanceRequest>,
) -> AppResult<Created<AttendanceRecord>> {
    authorize(&current_user, Operation::RecordAttendance)?;

    let record = state
        .attendance_service
        .record_one(payload.student_id, current_user.id, &payload.status)
        .await?;
    Ok(Created(record))
}

/// Record attendance for a whole class (teacher or admin)
///
/// Best-effort: check `error_count` for students that could not be recorded.
#[utoipa::path(
    post,
    path = "/attendance/class",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    request_body = RecordClassAttendanceRequest,
    responses(
        (status = 201, description = "Class recorded (possibly partially)", body = BulkResult),
        (status = 400, description = "Invalid status in map"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Class not found")
    )
)]
pub async fn record_for_class(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<RecordClassAttendanceRequest>,
) -> AppResult<Created<BulkResult>> {
    authorize(&current_user, Operation::RecordAttendance)?;

    let result = state
        .attendance_service
        .record_for_class(payload.class_id, current_user.id, payload.statuses)
        .await?;
    Ok(Created(result))
}

/// Records created or last updated by the caller
#[utoipa::path(
    get,
    path = "/attendance/recorded-by-me",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's recordings", body = Vec<AttendanceEntry>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn recorded_by_me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(&current_user, Operation::ReadOwnRecordings)?;

    let records = state
        .attendance_service
        .list_recorded_by(current_user.id)
        .await?;
    Ok(Json(ApiResponse::success(records)))
}

/// The caller's own attendance
#[utoipa::path(
    get,
    path = "/attendance/my-attendance",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller's attendance", body = Vec<AttendanceEntry>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn my_attendance(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(
        &current_user,
        Operation::ReadStudentAttendance { student_id: current_user.id },
    )?;

    let records = state
        .attendance_service
        .list_for_student(current_user.id)
        .await?;
    Ok(Json(ApiResponse::success(records)))
}

/// One student's attendance (staff, or the student themself)
#[utoipa::path(
    get,
    path = "/attendance/student/{id}",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Student account ID")),
    responses(
        (status = 200, description = "Student attendance", body = Vec<AttendanceEntry>),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn student_attendance(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(student_id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(&current_user, Operation::ReadStudentAttendance { student_id })?;

    let records = state.attendance_service.list_for_student(student_id).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Records whose date falls within an inclusive range (teacher or admin)
#[utoipa::path(
    get,
    path = "/attendance/range",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Records in range", body = Vec<AttendanceEntry>),
        (status = 400, description = "Malformed or reversed range"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn by_date_range(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedQuery(query): ValidatedQuery<DateRangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<AttendanceEntry>>>> {
    authorize(&current_user, Operation::ReadAttendanceByDateRange)?;

    let range = DateRange::new(query.start, query.end)?;
    let records = state.attendance_service.list_between(range).await?;
    Ok(Json(ApiResponse::success(records)))
}

/// Record counts per status
///
/// Students always receive their own counts.
#[utoipa::path(
    get,
    path = "/attendance/stats",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(StatsQuery),
    responses(
        (status = 200, description = "Counts per status", body = Vec<StatusCount>),
        (status = 403, description = "Student asked for another student")
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedQuery(query): ValidatedQuery<StatsQuery>,
) -> AppResult<Json<ApiResponse<Vec<StatusCount>>>> {
    authorize(
        &current_user,
        Operation::ReadAttendanceStats { student_id: query.student_id },
    )?;

    let scope = stats_scope(&current_user.caller(), query.student_id);
    let counts = state.attendance_service.stats(scope).await?;
    Ok(Json(ApiResponse::success(counts)))
}

/// Correct a record's status (teacher or admin)
///
/// The caller becomes the record's recorder and `recorded_at` is refreshed.
#[utoipa::path(
    put,
    path = "/attendance/{id}",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Attendance record ID")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Record updated", body = AttendanceEntry),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn update_attendance(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<UpdateAttendanceRequest>,
) -> AppResult<Json<ApiResponse<AttendanceEntry>>> {
    authorize(&current_user, Operation::UpdateAttendance)?;

    let record = state
        .attendance_service
        .update(id, &payload.status, current_user.id)
        .await?;
    Ok(Json(ApiResponse::with_message(record, "Attendance updated")))
}

/// Delete a record (admin only)
#[utoipa::path(
    delete,
    path = "/attendance/{id}",
    tag = "Attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Attendance record ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found")
    )
)]
pub async fn delete_attendance(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    authorize(&current_user, Operation::DeleteAttendance)?;

    state.attendance_service.delete(id).await?;
    Ok(NoContent)
}
