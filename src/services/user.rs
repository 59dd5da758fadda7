//! User service
//!
//! Admin authentication and account bootstrap:
//! - login/logout with 7-day bearer sessions
//! - session validation for the admin API
//! - `ensure_admin`, used by the `create-admin` binary

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, User, UserRole};
use crate::services::password::{hash_password, needs_rehash, validate_password, verify_password, PasswordError};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials or inactive account)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<PasswordError> for UserServiceError {
    fn from(e: PasswordError) -> Self {
        if e.is_policy() {
            UserServiceError::ValidationError(e.to_string())
        } else {
            UserServiceError::InternalError(e.into())
        }
    }
}

/// What `ensure_admin` did
#[derive(Debug, Clone)]
pub enum AdminBootstrap {
    /// No admin existed; a new one was created
    Created(User),
    /// An admin already existed; its password was reset
    PasswordReset(User),
}

impl AdminBootstrap {
    pub fn user(&self) -> &User {
        match self {
            AdminBootstrap::Created(user) | AdminBootstrap::PasswordReset(user) => user,
        }
    }
}

/// Input for login
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// User service for authentication and admin bootstrap
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn UserRepository>, session_repo: Arc<dyn SessionRepository>) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Create a user with a hashed password
    ///
    /// # Errors
    ///
    /// - `ValidationError` for a blank or malformed email, or a password that
    ///   fails [`validate_password`]
    /// - `UserExists` when the email is taken
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        validate_credentials(&input.email, &input.password)?;

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(input.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: input.email.trim().to_lowercase(),
            password_hash: hash_password(&input.password)?,
            first_name: input.first_name,
            last_name: input.last_name,
            role: input.role,
            is_active: true,
            is_system: input.is_system,
            created_at: now,
            updated_at: now,
        };

        let created = self.user_repo.create(&user).await.context("Failed to create user")?;
        tracing::info!(user_id = %created.id, role = %created.role, "User created");
        Ok(created)
    }

    /// Make sure an admin account with a known password exists.
    ///
    /// When any admin exists, the oldest one gets `password`; otherwise a new
    /// admin is created with `email`.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<AdminBootstrap, UserServiceError> {
        validate_password(password)?;

        let existing = self
            .user_repo
            .find_first_by_role(UserRole::Admin)
            .await
            .context("Failed to look up admin user")?;

        if let Some(mut admin) = existing {
            let hash = hash_password(password)?;
            self.user_repo
                .update_password(&admin.id, &hash)
                .await
                .context("Failed to update admin password")?;
            admin.password_hash = hash;
            tracing::info!(email = %admin.email, "Admin already exists; password updated");
            return Ok(AdminBootstrap::PasswordReset(admin));
        }

        let admin = self
            .create_user(CreateUserInput {
                email: email.to_string(),
                password: password.to_string(),
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                role: UserRole::Admin,
                is_system: false,
            })
            .await?;
        Ok(AdminBootstrap::Created(admin))
    }

    /// Check credentials and open a session
    ///
    /// # Errors
    ///
    /// `AuthenticationError` for unknown email, wrong password or an inactive account.
    /// The message does not reveal which.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let invalid = || UserServiceError::AuthenticationError("Invalid email or password".to_string());

        let user = match self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to get user by email")?
        {
            Some(user) => user,
            None => {
                tracing::warn!(email = %input.email, "Login failed: unknown email");
                return Err(invalid());
            }
        };

        let password_valid = verify_password(&input.password, &user.password_hash)?;
        if !password_valid {
            tracing::warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(invalid());
        }

        if !user.is_active {
            tracing::warn!(user_id = %user.id, "Login failed: account inactive");
            return Err(invalid());
        }

        if needs_rehash(&user.password_hash) {
            // login already succeeded; a failed upgrade is retried next time
            match hash_password(&input.password) {
                Ok(hash) => {
                    if let Err(e) = self.user_repo.update_password(&user.id, &hash).await {
                        tracing::warn!(user_id = %user.id, "Failed to upgrade password hash: {}", e);
                    } else {
                        tracing::info!(user_id = %user.id, "Password hash upgraded");
                    }
                }
                Err(e) => tracing::warn!(user_id = %user.id, "Failed to upgrade password hash: {}", e),
            }
        }

        let session = self.create_session(&user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(session)
    }

    /// End a session; unknown tokens are ignored
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Expired sessions are deleted and treated as absent, as are sessions of
    /// deactivated users.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            if let Err(e) = self.session_repo.delete(token).await {
                tracing::warn!("Failed to delete expired session: {}", e);
            }
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(&session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(|u| u.is_active))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        let user = self
            .user_repo
            .get_by_email(email)
            .await
            .context("Failed to get user by email")?;
        Ok(user)
    }

    /// Delete all expired sessions, returning how many were removed
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, UserServiceError> {
        let count = self
            .session_repo
            .delete_expired()
            .await
            .context("Failed to delete expired sessions")?;
        Ok(count)
    }

    async fn create_session(&self, user_id: &str) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        let created = self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;
        Ok(created)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), UserServiceError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(UserServiceError::ValidationError("Email cannot be empty".to_string()));
    }
    if !email.contains('@') {
        return Err(UserServiceError::ValidationError("Invalid email format".to_string()));
    }
    validate_password(password)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};

    async fn setup_test_service() -> (DynDatabasePool, UserService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let user_repo = SqlxUserRepository::boxed(pool.clone());
        let session_repo = SqlxSessionRepository::boxed(pool.clone());
        (pool, UserService::new(user_repo, session_repo))
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_when_missing() {
        let (_pool, service) = setup_test_service().await;

        let outcome = service
            .ensure_admin("admin@sawavo.com", "s3cret-serum")
            .await
            .expect("ensure_admin failed");

        match &outcome {
            AdminBootstrap::Created(user) => {
                assert_eq!(user.email, "admin@sawavo.com");
                assert_eq!(user.role, UserRole::Admin);
                assert_eq!(user.first_name, "Admin");
                assert!(user.is_active);
                assert!(!user.is_system);
            }
            other => panic!("expected Created, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_resets_existing_password() {
        let (_pool, service) = setup_test_service().await;
        service.ensure_admin("admin@sawavo.com", "first-pass").await.unwrap();

        // A different email does not create a second admin
        let outcome = service.ensure_admin("other@sawavo.com", "second-pass").await.unwrap();
        assert!(matches!(outcome, AdminBootstrap::PasswordReset(_)));
        assert_eq!(outcome.user().email, "admin@sawavo.com");

        assert!(service.login(LoginInput::new("admin@sawavo.com", "first-pass")).await.is_err());
        assert!(service.login(LoginInput::new("admin@sawavo.com", "second-pass")).await.is_ok());
        assert!(service.get_by_email("other@sawavo.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ensure_admin_rejects_weak_password() {
        let (_pool, service) = setup_test_service().await;

        for weak in ["", "admin12", "tt55oo77 "] {
            let result = service.ensure_admin("admin@sawavo.com", weak).await;
            assert!(matches!(result, Err(UserServiceError::ValidationError(_))), "{:?}", weak);
        }
        assert!(service.get_by_email("admin@sawavo.com").await.unwrap().is_none());

        // an existing admin keeps its password
        service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap();
        assert!(service.ensure_admin("admin@sawavo.com", "short").await.is_err());
        assert!(service.login(LoginInput::new("admin@sawavo.com", "tt55oo77")).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_upgrades_outdated_hash() {
        use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
        use argon2::{Algorithm, Argon2, Params, Version};

        let (pool, service) = setup_test_service().await;
        let admin = match service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap() {
            AdminBootstrap::Created(user) => user,
            other => panic!("expected Created, got {:?}", other),
        };
        let outdated = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::new(4096, 1, 1, None).unwrap())
            .hash_password(b"tt55oo77", &SaltString::generate(&mut OsRng))
            .unwrap()
            .to_string();
        SqlxUserRepository::new(pool.clone())
            .update_password(&admin.id, &outdated)
            .await
            .unwrap();

        service.login(LoginInput::new("admin@sawavo.com", "tt55oo77")).await.unwrap();

        let stored = service.get_by_email("admin@sawavo.com").await.unwrap().unwrap().password_hash;
        assert_ne!(stored, outdated);
        assert!(!needs_rehash(&stored));
        assert!(verify_password("tt55oo77", &stored).unwrap());
    }

    #[tokio::test]
    async fn test_login_and_validate_session() {
        let (_pool, service) = setup_test_service().await;
        service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap();

        let session = service
            .login(LoginInput::new("Admin@Sawavo.com", "tt55oo77"))
            .await
            .expect("Login failed");
        assert_eq!(session.id.len(), 64);
        let days = (session.expires_at - session.created_at).num_days();
        assert_eq!(days, 7);

        let user = service.validate_session(&session.id).await.unwrap().expect("Session invalid");
        assert!(user.is_admin());

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        let (_pool, service) = setup_test_service().await;
        service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap();

        let wrong = service.login(LoginInput::new("admin@sawavo.com", "nope")).await;
        assert!(matches!(wrong, Err(UserServiceError::AuthenticationError(_))));

        let unknown = service.login(LoginInput::new("ghost@sawavo.com", "tt55oo77")).await;
        assert!(matches!(unknown, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let (pool, service) = setup_test_service().await;
        service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap();
        pool.execute("UPDATE users SET is_active = 0").await.unwrap();

        let result = service.login(LoginInput::new("admin@sawavo.com", "tt55oo77")).await;
        assert!(matches!(result, Err(UserServiceError::AuthenticationError(_))));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let (pool, _) = setup_test_service().await;
        let service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            -1,
        );
        service.ensure_admin("admin@sawavo.com", "tt55oo77").await.unwrap();

        let session = service.login(LoginInput::new("admin@sawavo.com", "tt55oo77")).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
        assert_eq!(service.cleanup_expired_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_user_validation_and_duplicates() {
        let (_pool, service) = setup_test_service().await;
        let input = |email: &str, password: &str| CreateUserInput {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "A".into(),
            last_name: "B".into(),
            role: UserRole::Customer,
            is_system: false,
        };

        assert!(matches!(
            service.create_user(input("not-an-email", "tt55oo77")).await,
            Err(UserServiceError::ValidationError(_))
        ));
        for weak in ["", "short", " tt55oo77"] {
            assert!(matches!(
                service.create_user(input("a@sawavo.com", weak)).await,
                Err(UserServiceError::ValidationError(_))
            ));
        }

        service.create_user(input("a@sawavo.com", "tt55oo77")).await.unwrap();
        assert!(matches!(
            service.create_user(input("A@sawavo.com", "tt55oo77")).await,
            Err(UserServiceError::UserExists(_))
        ));
    }
}
