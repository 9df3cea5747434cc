//! Profile and account listing handlers.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{authorize, CurrentUser};
use crate::api::AppState;
use crate::domain::{AccountResponse, Operation};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Profile update request. Role and password cannot be changed here.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    #[schema(example = "Jane Q. Doe")]
    pub user_name: String,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_accounts))
        .route("/students", get(list_students))
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = AccountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    authorize(&current_user, Operation::ReadProfile { account_id: current_user.id })?;

    let account = state.account_service.get_profile(current_user.id).await?;
    Ok(Json(ApiResponse::success(AccountResponse::from(account))))
}

/// Update the caller's display name and email
#[utoipa::path(
    put,
    path = "/profile",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AccountResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<AccountResponse>>> {
    authorize(&current_user, Operation::UpdateProfile { account_id: current_user.id })?;

    let account = state
        .account_service
        .update_profile(current_user.id, payload.user_name, payload.email)
        .await?;

    Ok(Json(ApiResponse::with_message(
        AccountResponse::from(account),
        "Profile updated",
    )))
}

/// List every account (admin only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All accounts", body = Vec<AccountResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AccountResponse>>>> {
    authorize(&current_user, Operation::ListAccounts)?;

    let accounts = state.account_service.list_accounts().await?;
    Ok(Json(ApiResponse::success(
        accounts.into_iter().map(AccountResponse::from).collect(),
    )))
}

/// List student accounts ordered by name
#[utoipa::path(
    get,
    path = "/students",
    tag = "Accounts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All students", body = Vec<AccountResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<Vec<AccountResponse>>>> {
    authorize(&current_user, Operation::ListStudents)?;

    let students = state.account_service.list_students().await?;
    Ok(Json(ApiResponse::success(
        students.into_iter().map(AccountResponse::from).collect(),
    )))
}
