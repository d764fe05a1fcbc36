use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account;
use crate::errors;

/// Application roles, stored as their lowercase wire strings.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppRole {
    Atendente,
    Produtor,
    Ceo,
    Admin,
}

impl AppRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppRole::Atendente => "atendente",
            AppRole::Produtor => "produtor",
            AppRole::Ceo => "ceo",
            AppRole::Admin => "admin",
        }
    }

    /// Roles allowed to create, edit and delete demands.
    pub fn is_requester(&self) -> bool {
        matches!(self, AppRole::Atendente | AppRole::Ceo | AppRole::Admin)
    }
}

impl fmt::Display for AppRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppRole {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atendente" => Ok(AppRole::Atendente),
            "produtor" => Ok(AppRole::Produtor),
            "ceo" => Ok(AppRole::Ceo),
            "admin" => Ok(AppRole::Admin),
            other => Err(errors::ModelError::Validation(format!("invalid role: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_role")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
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

/// Replace whatever role the account holds (one role per account).
pub async fn set_role(db: &DatabaseConnection, user_id: Uuid, role: AppRole) -> Result<Model, errors::ModelError> {
    Entity::delete_many()
        .filter(Column::UserId.eq(user_id))
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_role(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<AppRole>, errors::ModelError> {
    let row = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    match row {
        Some(r) => Ok(Some(r.role.parse()?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::AppRole;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [AppRole::Atendente, AppRole::Produtor, AppRole::Ceo, AppRole::Admin] {
            assert_eq!(role.as_str().parse::<AppRole>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("gerente".parse::<AppRole>().is_err());
    }

    #[test]
    fn requester_roles() {
        assert!(AppRole::Atendente.is_requester());
        assert!(AppRole::Ceo.is_requester());
        assert!(AppRole::Admin.is_requester());
        assert!(!AppRole::Produtor.is_requester());
    }
}
