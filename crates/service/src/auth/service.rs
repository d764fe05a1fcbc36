use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, token_ttl_hours: 12, password_algorithm: "argon2".into() }
    }
}

/// Token payload; the server middleware decodes the same shape.
#[derive(serde::Serialize)]
struct Claims {
    sub: String,
    uid: String,
    role: String,
    name: String,
    exp: usize,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Create an account with profile, role and hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use models::user_role::AppRole;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { email: "user@example.com".into(), display_name: "Maria".into(), password: "Secret123".into(), role: AppRole::Atendente };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email, role = %input.role))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        models::account::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::profile::validate_display_name(&input.display_name)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        if input.password.len() < 6 {
            return Err(AuthError::Validation("password too short (>=6)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.display_name, input.role).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use models::user_role::AppRole;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let cfg = AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() };
    /// let svc = AuthService::new(repo.clone(), cfg);
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), display_name: "N".into(), password: "Passw0rd".into(), role: AppRole::Produtor }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            let exp = (chrono::Utc::now() + chrono::Duration::hours(self.cfg.token_ttl_hours)).timestamp() as usize;
            let claims = Claims {
                sub: user.email.clone(),
                uid: user.id.to_string(),
                role: user.role.as_str().to_string(),
                name: user.display_name.clone(),
                exp,
            };
            token = Some(
                encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
                    .map_err(|e| AuthError::TokenError(e.to_string()))?,
            );
        }

        Ok(AuthSession { user, token })
    }

    /// Fresh profile/role lookup for an authenticated id (the `/auth/me` view).
    pub async fn current_user(&self, id: uuid::Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use models::user_role::AppRole;

    fn svc_with_secret() -> AuthService<MockAuthRepository> {
        let repo = Arc::new(MockAuthRepository::default());
        let cfg = AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() };
        AuthService::new(repo, cfg)
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.into(),
            display_name: "Mhad".into(),
            password: "S3cret!".into(),
            role: AppRole::Produtor,
        }
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let svc = svc_with_secret();
        let mut input = register_input("p@studio.com");
        input.password = "12345".into();
        assert!(matches!(svc.register(input).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let svc = svc_with_secret();
        svc.register(register_input("p@studio.com")).await.unwrap();
        assert!(matches!(svc.register(register_input("p@studio.com")).await, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let svc = svc_with_secret();
        svc.register(register_input("p@studio.com")).await.unwrap();
        let res = svc
            .login(LoginInput { email: "p@studio.com".into(), password: "nope".into() })
            .await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn login_issues_token_with_secret() {
        let svc = svc_with_secret();
        svc.register(register_input("p@studio.com")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "p@studio.com".into(), password: "S3cret!".into() })
            .await
            .unwrap();
        assert!(session.token.is_some());
        assert_eq!(session.user.role, AppRole::Produtor);
    }
}
