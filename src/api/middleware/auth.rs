//! JWT authentication middleware and the policy gate used by handlers.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{decide, Caller, Operation, Role};
use crate::errors::AppError;

/// Authenticated account extracted from the JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn caller(&self) -> Caller {
        Caller::new(self.id, self.role)
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.auth_service.verify_token(token)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Consult the access policy for the current caller.
///
/// A denial is reported as Forbidden, never as NotFound.
pub fn authorize(user: &CurrentUser, operation: Operation) -> Result<(), AppError> {
    if decide(Some(&user.caller()), operation).is_allowed() {
        Ok(())
    } else {
        tracing::debug!(account_id = user.id, role = %user.role, ?operation, "Access denied by policy");
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("{}@example.com", id),
            role,
        }
    }

    #[test]
    fn test_denial_is_forbidden() {
        let result = authorize(&user(1, Role::Student), Operation::ReadAllAttendance);
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[test]
    fn test_student_reads_own_attendance() {
        let result = authorize(
            &user(4, Role::Student),
            Operation::ReadStudentAttendance { student_id: 4 },
        );
        assert!(result.is_ok());
    }
}
