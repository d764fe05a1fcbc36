use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account;
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "producer_availability")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub slot_start: Time,
    pub slot_end: Time,
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

pub fn validate_slot(slot_start: Time, slot_end: Time) -> Result<(), errors::ModelError> {
    if slot_start >= slot_end {
        return Err(errors::ModelError::Validation(
            "slot start must be before slot end".into(),
        ));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    date: Date,
    slot_start: Time,
    slot_end: Time,
) -> Result<Model, errors::ModelError> {
    validate_slot(slot_start, slot_end)?;
    let duplicate = Entity::find()
        .filter(Column::UserId.eq(user_id))
        .filter(Column::Date.eq(date))
        .filter(Column::SlotStart.eq(slot_start))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    if duplicate.is_some() {
        return Err(errors::ModelError::Validation("slot already registered".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        date: Set(date),
        slot_start: Set(slot_start),
        slot_end: Set(slot_end),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// A producer's own slots, ordered by date then start time.
pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .order_by_asc(Column::Date)
        .order_by_asc(Column::SlotStart)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_asc(Column::Date)
        .order_by_asc(Column::SlotStart)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn slot_must_start_before_end() {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(validate_slot(eight, ten).is_ok());
        assert!(validate_slot(ten, eight).is_err());
        assert!(validate_slot(eight, eight).is_err());
    }
}
