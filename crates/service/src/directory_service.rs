//! Directory reads: producers for assignment selects and the user
//! management table (profiles joined with roles in memory).

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use uuid::Uuid;

use models::user_role::AppRole;
use models::{profile, user_role};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub display_name: String,
    pub role: AppRole,
}

/// Display names of every account holding the producer role, sorted.
pub async fn list_producers(db: &DatabaseConnection) -> Result<Vec<String>, ServiceError> {
    let roles = user_role::Entity::find()
        .filter(user_role::Column::Role.eq(AppRole::Produtor.as_str()))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if roles.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = roles.iter().map(|r| r.user_id).collect();
    let profiles = profile::Entity::find()
        .filter(profile::Column::UserId.is_in(ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let mut names: Vec<String> = profiles.into_iter().map(|p| p.display_name).collect();
    names.sort();
    Ok(names)
}

/// Every account that has both a profile and a role, for the admin table.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<UserSummary>, ServiceError> {
    let profiles = profile::Entity::find()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let roles = user_role::Entity::find()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let role_map: HashMap<Uuid, AppRole> = roles
        .into_iter()
        .filter_map(|r| r.role.parse::<AppRole>().ok().map(|role| (r.user_id, role)))
        .collect();

    let mut users: Vec<UserSummary> = profiles
        .into_iter()
        .filter_map(|p| {
            role_map.get(&p.user_id).map(|role| UserSummary {
                user_id: p.user_id,
                display_name: p.display_name,
                role: *role,
            })
        })
        .collect();
    users.sort_by(|a, b| a.display_name.cmp(&b.display_name));
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use uuid::Uuid;

    #[tokio::test]
    async fn producers_listing_is_sorted_and_role_scoped() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;

        let marker = Uuid::new_v4().simple().to_string();
        let producer = models::account::create(&db, &format!("prod_{}@example.com", marker)).await?;
        models::profile::create(&db, producer.id, &format!("Zb {}", marker)).await?;
        models::user_role::set_role(&db, producer.id, AppRole::Produtor).await?;

        let attendant = models::account::create(&db, &format!("at_{}@example.com", marker)).await?;
        models::profile::create(&db, attendant.id, &format!("Aa {}", marker)).await?;
        models::user_role::set_role(&db, attendant.id, AppRole::Atendente).await?;

        let producers = list_producers(&db).await?;
        assert!(producers.contains(&format!("Zb {}", marker)));
        assert!(!producers.contains(&format!("Aa {}", marker)));
        let mut sorted = producers.clone();
        sorted.sort();
        assert_eq!(producers, sorted);

        let users = list_users(&db).await?;
        assert!(users.iter().any(|u| u.user_id == attendant.id && u.role == AppRole::Atendente));

        models::account::hard_delete(&db, producer.id).await?;
        models::account::hard_delete(&db, attendant.id).await?;
        Ok(())
    }
}
