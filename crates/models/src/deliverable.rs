use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::demand;
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "demand_deliverable")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub demand_id: Uuid,
    pub storage_path: Option<String>,
    pub file_name: Option<String>,
    pub comments: Option<String>,
    pub uploaded_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Demand,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Demand => Entity::belongs_to(demand::Entity)
                .from(Column::DemandId)
                .to(demand::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Incoming deliverable fields; `None` keeps whatever is already stored,
/// so a file upload does not wipe comments and vice versa.
#[derive(Debug, Clone, Default)]
pub struct DeliverablePatch {
    pub storage_path: Option<String>,
    pub file_name: Option<String>,
    pub comments: Option<String>,
}

pub async fn find_by_demand(db: &DatabaseConnection, demand_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::DemandId.eq(demand_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// One deliverable per demand: insert on first write, merge afterwards.
pub async fn upsert(
    db: &DatabaseConnection,
    demand_id: Uuid,
    patch: DeliverablePatch,
    uploaded_by: Uuid,
) -> Result<Model, errors::ModelError> {
    let now = Utc::now().into();
    if let Some(existing) = find_by_demand(db, demand_id).await? {
        let mut am: ActiveModel = existing.clone().into();
        if let Some(path) = patch.storage_path {
            am.storage_path = Set(demand::none_if_blank(path));
        }
        if let Some(name) = patch.file_name {
            am.file_name = Set(demand::none_if_blank(name));
        }
        if let Some(comments) = patch.comments {
            am.comments = Set(demand::none_if_blank(comments));
        }
        am.uploaded_by = Set(uploaded_by);
        am.updated_at = Set(now);
        am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
    } else {
        let am = ActiveModel {
            id: Set(Uuid::new_v4()),
            demand_id: Set(demand_id),
            storage_path: Set(patch.storage_path.and_then(demand::none_if_blank)),
            file_name: Set(patch.file_name.and_then(demand::none_if_blank)),
            comments: Set(patch.comments.and_then(demand::none_if_blank)),
            uploaded_by: Set(uploaded_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
    }
}
