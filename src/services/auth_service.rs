//! Authentication service - registration, login and token verification.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Account, NewAccount, Password, Role};
use crate::errors::{AppError, AppResult};
use crate::infra::Repositories;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 360000)]
    pub expires_in: i64,
}

/// Registration input, already shape-validated by the handler.
#[derive(Debug, Clone)]
pub struct Registration {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new account
    async fn register(&self, registration: Registration) -> AppResult<Account>;

    /// Login and return a bearer token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify a bearer token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(account: &Account, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: account.id,
        email: account.email.clone(),
        role: account.role,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService.
pub struct Authenticator<R: Repositories> {
    repos: Arc<R>,
    config: Config,
}

impl<R: Repositories> Authenticator<R> {
    pub fn new(repos: Arc<R>, config: Config) -> Self {
        Self { repos, config }
    }
}

#[async_trait]
impl<R: Repositories> AuthService for Authenticator<R> {
    async fn register(&self, registration: Registration) -> AppResult<Account> {
        let accounts = self.repos.accounts();
        if accounts.find_by_email(&registration.email).await?.is_some() {
            return Err(AppError::conflict("Account email"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        accounts
            .create(NewAccount {
                display_name: registration.display_name,
                email: registration.email,
                role: registration.role,
                password_hash,
            })
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let account = self.repos.accounts().find_by_email(&email).await?;

        // Unknown emails still pay for one verification.
        let verified = match &account {
            Some(account) => Password::from_hash(account.password_hash.clone()).verify(&password),
            None => {
                Password::decoy().verify(&password);
                false
            }
        };

        match account {
            Some(account) if verified => {
                tracing::info!(account_id = account.id, "Login succeeded");
                generate_token(&account, &self.config)
            }
            _ => {
                tracing::debug!("Login rejected");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        MockAccountRepository, MockAttendanceRepository, MockPersistence, MockRosterRepository,
    };
    use mockall::predicate::eq;

    const SECRET: &str = "unit-test-secret-that-is-long-enough-123";

    fn account(id: i32, password: &str, role: Role) -> Account {
        Account {
            id,
            display_name: "Test Account".to_string(),
            email: "test@example.com".to_string(),
            role,
            password_hash: Password::new(password).unwrap().into_string(),
            created_at: Utc::now(),
        }
    }

    fn authenticator(accounts: MockAccountRepository) -> Authenticator<MockPersistence> {
        let repos = MockPersistence::new(
            accounts,
            MockRosterRepository::new(),
            MockAttendanceRepository::new(),
        );
        Authenticator::new(Arc::new(repos), Config::with_database("sqlite::memory:", SECRET))
    }

    #[tokio::test]
    async fn test_login_issues_token_with_role() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .with(eq("test@example.com"))
            .returning(|_| Ok(Some(account(3, "correct-horse", Role::Teacher))));

        let auth = authenticator(accounts);
        let token = auth
            .login("test@example.com".to_string(), "correct-horse".to_string())
            .await
            .unwrap();

        assert_eq!(token.token_type, "Bearer");
        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.sub, 3);
        assert_eq!(claims.role, Role::Teacher);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_look_alike() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .with(eq("test@example.com"))
            .returning(|_| Ok(Some(account(3, "correct-horse", Role::Student))));
        accounts
            .expect_find_by_email()
            .with(eq("nobody@example.com"))
            .returning(|_| Ok(None));

        let auth = authenticator(accounts);
        let wrong = auth
            .login("test@example.com".to_string(), "battery-staple".to_string())
            .await;
        let unknown = auth
            .login("nobody@example.com".to_string(), "battery-staple".to_string())
            .await;

        assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_register_existing_email_conflicts_without_insert() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .returning(|_| Ok(Some(account(1, "whatever-pass", Role::Student))));
        accounts.expect_create().never();

        let result = authenticator(accounts)
            .register(Registration {
                display_name: "Dup".to_string(),
                email: "test@example.com".to_string(),
                password: "long-enough-pass".to_string(),
                role: Role::Student,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_plaintext() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().returning(|_| Ok(None));
        accounts
            .expect_create()
            .withf(|new| new.password_hash != "long-enough-pass" && new.role == Role::Teacher)
            .returning(|new| {
                Ok(Account {
                    id: 9,
                    display_name: new.display_name,
                    email: new.email,
                    role: new.role,
                    password_hash: new.password_hash,
                    created_at: Utc::now(),
                })
            });

        let created = authenticator(accounts)
            .register(Registration {
                display_name: "Teach".to_string(),
                email: "teach@example.com".to_string(),
                password: "long-enough-pass".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap();

        assert_eq!(created.id, 9);
        assert!(Password::from_hash(created.password_hash).verify("long-enough-pass"));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let auth = authenticator(MockAccountRepository::new());
        assert!(matches!(auth.verify_token("not.a.token"), Err(AppError::Jwt(_))));
    }
}
