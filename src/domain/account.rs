//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER};
use crate::errors::{AppError, AppResult};

/// Account roles. Fixed at registration; there is no role-update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Teachers and admins may record attendance.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Teacher)
    }

    pub fn is_student(&self) -> bool {
        matches!(self, Role::Student)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Teacher => ROLE_TEACHER,
            Role::Student => ROLE_STUDENT,
        }
    }

    /// Parse a role supplied by a client, rejecting unknown values.
    pub fn parse(value: &str) -> AppResult<Self> {
        match value {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_TEACHER => Ok(Role::Teacher),
            ROLE_STUDENT => Ok(Role::Student),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Lenient conversion for stored and token values.
/// Unknown strings fall back to the least privileged role.
impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::parse(s).unwrap_or(Role::Student)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub display_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_student(&self) -> bool {
        self.role.is_student()
    }
}

/// Data required to persist a new account. The credential is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub display_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Jane Doe")]
    pub user_name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    #[schema(example = "teacher")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            user_name: account.display_name,
            email: account.email,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(Role::parse("teacher").unwrap(), Role::Teacher);
        assert!(matches!(Role::parse("janitor"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_role_from_stored_value_defaults_to_student() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("superuser"), Role::Student);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Teacher.is_staff());
        assert!(!Role::Student.is_staff());
    }

    #[test]
    fn test_response_hides_password_hash() {
        let account = Account {
            id: 7,
            display_name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
            role: Role::Student,
            password_hash: "secret-hash".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&AccountResponse::from(account)).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"student\""));
    }
}
