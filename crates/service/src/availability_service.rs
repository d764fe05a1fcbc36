//! Producer availability slots: own-calendar CRUD plus the cross-producer
//! view used for scheduling reference.

use std::collections::HashMap;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::availability;
use models::user_role::AppRole;

use crate::demand::service::Actor;
use crate::errors::ServiceError;

/// One slot with the producer's display name, for the shared calendar.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityView {
    pub producer_name: String,
    pub date: chrono::NaiveDate,
    pub slot_start: chrono::NaiveTime,
    pub slot_end: chrono::NaiveTime,
}

pub async fn list_my_slots(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<availability::Model>, ServiceError> {
    Ok(availability::list_for_user(db, user_id).await?)
}

#[instrument(skip(db, actor), fields(user = %actor.user_id, %date))]
pub async fn add_slot(
    db: &DatabaseConnection,
    actor: &Actor,
    date: chrono::NaiveDate,
    slot_start: chrono::NaiveTime,
    slot_end: chrono::NaiveTime,
) -> Result<availability::Model, ServiceError> {
    if actor.role != AppRole::Produtor {
        return Err(ServiceError::forbidden("publishing availability"));
    }
    let created = availability::create(db, actor.user_id, date, slot_start, slot_end).await?;
    info!(id = %created.id, "availability_slot_added");
    Ok(created)
}

#[instrument(skip(db, actor), fields(user = %actor.user_id, slot = %slot_id))]
pub async fn delete_slot(db: &DatabaseConnection, actor: &Actor, slot_id: Uuid) -> Result<(), ServiceError> {
    let slot = availability::find_by_id(db, slot_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("availability slot"))?;
    if slot.user_id != actor.user_id {
        return Err(ServiceError::Forbidden("only the owner can remove a slot".into()));
    }
    availability::hard_delete(db, slot_id).await?;
    info!("availability_slot_removed");
    Ok(())
}

/// All producers' slots with display names, ordered by date then start.
/// Accounts without a profile are skipped rather than shown nameless.
pub async fn list_for_view(db: &DatabaseConnection) -> Result<Vec<AvailabilityView>, ServiceError> {
    let slots = availability::list_all(db).await?;

    use sea_orm::EntityTrait;
    let profiles = models::profile::Entity::find()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let names: HashMap<Uuid, String> = profiles.into_iter().map(|p| (p.user_id, p.display_name)).collect();

    Ok(slots
        .into_iter()
        .filter_map(|s| {
            names.get(&s.user_id).map(|name| AvailabilityView {
                producer_name: name.clone(),
                date: s.date,
                slot_start: s.slot_start,
                slot_end: s.slot_end,
            })
        })
        .collect())
}
