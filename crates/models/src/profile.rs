use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account;
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub display_name: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Account,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Account => Entity::belongs_to(account::Entity)
                .from(Column::UserId)
                .to(account::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_display_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("display name required".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, user_id: Uuid, display_name: &str) -> Result<Model, errors::ModelError> {
    validate_display_name(display_name)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        user_id: Set(user_id),
        display_name: Set(display_name.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Insert or update the display name for an account.
pub async fn upsert_display_name(db: &DatabaseConnection, user_id: Uuid, display_name: &str) -> Result<Model, errors::ModelError> {
    validate_display_name(display_name)?;
    match find_by_user(db, user_id).await? {
        Some(existing) => {
            let mut am: ActiveModel = existing.into();
            am.display_name = Set(display_name.trim().to_string());
            am.updated_at = Set(Utc::now().into());
            am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
        }
        None => create(db, user_id, display_name).await,
    }
}
