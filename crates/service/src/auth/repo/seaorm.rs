use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::user_role::AppRole;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    /// Join account + profile + role into the domain view.
    async fn hydrate(&self, account: models::account::Model) -> Result<Option<AuthUser>, AuthError> {
        let profile = models::profile::find_by_user(&self.db, account.id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        let role = models::user_role::find_role(&self.db, account.id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        // An account without profile or role cannot log in yet
        let (profile, role) = match (profile, role) {
            (Some(p), Some(r)) => (p, r),
            _ => return Ok(None),
        };
        Ok(Some(AuthUser {
            id: account.id,
            email: account.email,
            display_name: profile.display_name,
            role,
        }))
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let account = models::account::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        match account {
            Some(a) => self.hydrate(a).await,
            None => Ok(None),
        }
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        use sea_orm::EntityTrait;
        let account = models::account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        match account {
            Some(a) => self.hydrate(a).await,
            None => Ok(None),
        }
    }

    async fn create_user(&self, email: &str, display_name: &str, role: AppRole) -> Result<AuthUser, AuthError> {
        let account = models::account::create(&self.db, email)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let profile = models::profile::create(&self.db, account.id, display_name)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user_role::set_role(&self.db, account.id, role)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(AuthUser {
            id: account.id,
            email: account.email,
            display_name: profile.display_name,
            role,
        })
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        })
    }
}
