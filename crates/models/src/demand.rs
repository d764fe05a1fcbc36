use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account;
use crate::errors;

/// Pipeline stages, stored as their snake_case wire strings.
/// The flow is linear: aguardando -> em_producao -> concluido.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    Aguardando,
    EmProducao,
    Concluido,
}

impl DemandStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandStatus::Aguardando => "aguardando",
            DemandStatus::EmProducao => "em_producao",
            DemandStatus::Concluido => "concluido",
        }
    }
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemandStatus {
    type Err = errors::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aguardando" => Ok(DemandStatus::Aguardando),
            "em_producao" => Ok(DemandStatus::EmProducao),
            "concluido" => Ok(DemandStatus::Concluido),
            other => Err(errors::ModelError::Validation(format!("invalid status: {}", other))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "demand")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub status: String,
    pub start_at: Option<DateTimeWithTimeZone>,
    pub due_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Creator,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Creator => Entity::belongs_to(account::Entity)
                .from(Column::CreatedBy)
                .to(account::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields needed to insert a demand; status always starts at `aguardando`.
#[derive(Debug, Clone)]
pub struct NewDemand {
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub start_at: Option<DateTimeWithTimeZone>,
    pub due_at: Option<DateTimeWithTimeZone>,
    pub created_by: Uuid,
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("demand name required".into()));
    }
    Ok(())
}

pub fn validate_producer(producer_name: &str) -> Result<(), errors::ModelError> {
    if producer_name.trim().is_empty() {
        return Err(errors::ModelError::Validation("producer required".into()));
    }
    Ok(())
}

/// Start must not come after the due date when both are set.
pub fn validate_dates(
    start_at: Option<&DateTimeWithTimeZone>,
    due_at: Option<&DateTimeWithTimeZone>,
) -> Result<(), errors::ModelError> {
    if let (Some(start), Some(due)) = (start_at, due_at) {
        if start > due {
            return Err(errors::ModelError::Validation(
                "start date must be before the due date".into(),
            ));
        }
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, input: NewDemand) -> Result<Model, errors::ModelError> {
    validate_name(&input.name)?;
    validate_producer(&input.producer_name)?;
    validate_dates(input.start_at.as_ref(), input.due_at.as_ref())?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        artist_name: Set(input.artist_name.and_then(none_if_blank)),
        description: Set(input.description.and_then(none_if_blank)),
        producer_name: Set(input.producer_name.trim().to_string()),
        status: Set(DemandStatus::Aguardando.as_str().to_string()),
        start_at: Set(input.start_at),
        due_at: Set(input.due_at),
        created_by: Set(input.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Blank strings from forms become NULL columns.
pub fn none_if_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<bool, errors::ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
