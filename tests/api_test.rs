//! End-to-end tests for the HTTP API.
//!
//! Every test builds the full router over its own in-memory SQLite database,
//! so the real stores, migrations and policy checks are exercised.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use attendance_tracker::{create_router, AppState, Config, Database};

const SECRET: &str = "integration-test-secret-at-least-32-chars";

// =============================================================================
// Helpers
// =============================================================================

async fn app() -> Router {
    let config = Config::with_database("sqlite::memory:", SECRET);
    let database = Database::connect(&config).await.expect("database");
    create_router(AppState::from_config(Arc::new(database), config))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Register an account and log in; returns (id, token).
async fn sign_up(app: &Router, name: &str, role: &str) -> (i64, String) {
    let email = format!("{}@school.test", name.to_lowercase());
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "user_name": name,
            "email": email,
            "password": "password-123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {}: {}", name, body);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "password-123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login {}: {}", name, body);
    (id, body["access_token"].as_str().unwrap().to_string())
}

async fn create_class(app: &Router, admin: &str, code: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/classes",
        Some(admin),
        Some(json!({ "class_name": "Chemistry", "class_code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["class_id"].as_i64().unwrap()
}

async fn enroll(app: &Router, admin: &str, class_id: i64, student_id: i64) -> StatusCode {
    let (status, _) = send(
        app,
        Method::POST,
        &format!("/classes/{}/students", class_id),
        Some(admin),
        Some(json!({ "student_id": student_id })),
    )
    .await;
    status
}

fn records(body: &Value) -> Vec<Value> {
    body["data"].as_array().cloned().unwrap_or_default()
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_and_health() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/classes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/attendance", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Identity
// =============================================================================

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = app().await;
    sign_up(&app, "Ada", "student").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "user_name": "Other Ada",
            "email": "ada@school.test",
            "password": "password-456",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_role() {
    let app = app().await;
    sign_up(&app, "Grace", "teacher").await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "grace@school.test", "password": "not-the-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "user_name": "Mallory",
            "email": "mallory@school.test",
            "password": "password-123",
            "role": "principal",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_update_keeps_role() {
    let app = app().await;
    let (_, token) = sign_up(&app, "Linus", "student").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/profile",
        Some(&token),
        Some(json!({ "user_name": "Linus T", "email": "linus.t@school.test" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(&app, Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user_name"], "Linus T");
    assert_eq!(body["data"]["email"], "linus.t@school.test");
    assert_eq!(body["data"]["role"], "student");
}

// =============================================================================
// Roster
// =============================================================================

#[tokio::test]
async fn test_duplicate_enrollment_leaves_roster_unchanged() {
    let app = app().await;
    let (_, admin) = sign_up(&app, "Admin", "admin").await;
    let (student, _) = sign_up(&app, "Sam", "student").await;
    let class_id = create_class(&app, &admin, "CHEM-1").await;

    assert_eq!(enroll(&app, &admin, class_id, student).await, StatusCode::CREATED);
    assert_eq!(enroll(&app, &admin, class_id, student).await, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/classes/{}/students", class_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records(&body).len(), 1);
}

#[tokio::test]
async fn test_roster_management_is_admin_only() {
    let app = app().await;
    let (_, admin) = sign_up(&app, "Admin", "admin").await;
    let (_, teacher) = sign_up(&app, "Tess", "teacher").await;
    let (student, student_token) = sign_up(&app, "Sam", "student").await;
    let class_id = create_class(&app, &admin, "CHEM-2").await;

    assert_eq!(enroll(&app, &teacher, class_id, student).await, StatusCode::FORBIDDEN);
    let (status, _) = send(
        &app,
        Method::POST,
        "/classes",
        Some(&teacher),
        Some(json!({ "class_name": "Physics", "class_code": "PHY-1" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/classes/{}/available-students", class_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records(&body).len(), 1);

    assert_eq!(enroll(&app, &admin, class_id, student).await, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, "/classes/my-classes", Some(&student_token), None).await;
    assert_eq!(records(&body).len(), 1);
    assert_eq!(records(&body)[0]["class_code"], "CHEM-2");

    let (status, _) = send(&app, Method::GET, "/classes/my-classes", Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Attendance
// =============================================================================

#[tokio::test]
async fn test_class_recording_defaults_missing_students_to_absent() {
    let app = app().await;
    let (admin_id, admin) = sign_up(&app, "Admin", "admin").await;
    let (s1, _) = sign_up(&app, "Sue", "student").await;
    let (s2, _) = sign_up(&app, "Stan", "student").await;
    let class_id = create_class(&app, &admin, "CHEM-3").await;
    assert_eq!(enroll(&app, &admin, class_id, s1).await, StatusCode::CREATED);
    assert_eq!(enroll(&app, &admin, class_id, s2).await, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/attendance/class",
        Some(&admin),
        Some(json!({
            "class_id": class_id,
            "statuses": { (s1.to_string()): "late" },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        body["data"],
        json!({ "total": 2, "success_count": 2, "error_count": 0 })
    );

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/classes/{}/attendance", class_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = records(&body);
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row["recorded_by"].as_i64(), Some(admin_id));
        let expected = if row["student_id"].as_i64() == Some(s1) { "late" } else { "absent" };
        assert_eq!(row["status"], expected);
    }
}

#[tokio::test]
async fn test_invalid_status_in_class_map_records_nothing() {
    let app = app().await;
    let (_, admin) = sign_up(&app, "Admin", "admin").await;
    let (s1, _) = sign_up(&app, "Sue", "student").await;
    let class_id = create_class(&app, &admin, "CHEM-4").await;
    assert_eq!(enroll(&app, &admin, class_id, s1).await, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/attendance/class",
        Some(&admin),
        Some(json!({ "class_id": class_id, "statuses": { (s1.to_string()): "sick" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");

    let (_, body) = send(&app, Method::GET, "/attendance", Some(&admin), None).await;
    assert!(records(&body).is_empty());
}

#[tokio::test]
async fn test_update_rewrites_record_in_place() {
    let app = app().await;
    let (teacher_id, teacher) = sign_up(&app, "Tess", "teacher").await;
    let (s1, _) = sign_up(&app, "Sue", "student").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/attendance",
        Some(&teacher),
        Some(json!({ "student_id": s1, "status": "present" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let attendance_id = body["data"]["attendance_id"].as_i64().unwrap();
    let first_recorded: DateTime<Utc> = body["data"]["recorded_at"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/attendance/{}", attendance_id),
        Some(&teacher),
        Some(json!({ "status": "excused" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/attendance/student/{}", s1),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = records(&body);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "excused");
    assert_eq!(rows[0]["recorded_by"].as_i64(), Some(teacher_id));
    let refreshed: DateTime<Utc> = rows[0]["recorded_at"].as_str().unwrap().parse().unwrap();
    assert!(refreshed >= first_recorded);
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let app = app().await;
    let (_, teacher) = sign_up(&app, "Tess", "teacher").await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/attendance/9999",
        Some(&teacher),
        Some(json!({ "status": "late" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_student_sees_only_own_attendance() {
    let app = app().await;
    let (_, admin) = sign_up(&app, "Admin", "admin").await;
    let (_, teacher) = sign_up(&app, "Tess", "teacher").await;
    let (s1, s1_token) = sign_up(&app, "Sue", "student").await;
    let (s2, _) = sign_up(&app, "Stan", "student").await;

    for (student, status) in [(s1, "present"), (s1, "late"), (s2, "absent")] {
        let (code, _) = send(
            &app,
            Method::POST,
            "/attendance",
            Some(&teacher),
            Some(json!({ "student_id": student, "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/attendance/student/{}", s2),
        Some(&s1_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/attendance/student/{}", s1),
        Some(&s1_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records(&body).len(), 2);

    let (status, _) = send(&app, Method::GET, "/attendance", Some(&s1_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::GET, "/attendance", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records(&body).len(), 3);

    // Stats without a target are scoped to the calling student.
    let (status, body) = send(&app, Method::GET, "/attendance/stats", Some(&s1_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let total: i64 = records(&body).iter().map(|c| c["count"].as_i64().unwrap()).sum();
    assert_eq!(total, 2);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/attendance/stats?student_id={}", s2),
        Some(&s1_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_date_range_and_delete() {
    let app = app().await;
    let (_, admin) = sign_up(&app, "Admin", "admin").await;
    let (_, teacher) = sign_up(&app, "Tess", "teacher").await;
    let (s1, _) = sign_up(&app, "Sue", "student").await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/attendance",
        Some(&teacher),
        Some(json!({ "student_id": s1, "status": "present" })),
    )
    .await;
    let attendance_id = body["data"]["attendance_id"].as_i64().unwrap();

    let today = Utc::now().date_naive();
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/attendance/range?start={}&end={}", today, today),
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records(&body).len(), 1);

    let (status, _) = send(
        &app,
        Method::GET,
        "/attendance/range?start=2024-03-02&end=2024-03-01",
        Some(&teacher),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/attendance/{}", attendance_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&teacher), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
