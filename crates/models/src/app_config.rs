use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    pub value: Json,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn get(db: &DatabaseConnection, key: &str) -> Result<Option<Json>, errors::ModelError> {
    let row = Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(row.map(|r| r.value))
}

pub async fn set(db: &DatabaseConnection, key: &str, value: Json) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    if let Some(existing) = Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?
    {
        let mut am: ActiveModel = existing.into();
        am.value = Set(value);
        am.updated_at = Set(now);
        am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
    } else {
        let am = ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
        };
        am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
    }
}
