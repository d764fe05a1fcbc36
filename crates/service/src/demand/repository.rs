use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use models::demand::{self, DemandStatus, NewDemand};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Listing filters, all optional (dashboard selects).
#[derive(Debug, Clone, Default)]
pub struct DemandFilter {
    pub status: Option<DemandStatus>,
    pub producer_name: Option<String>,
    /// Exact artist match, for the per-artist report view
    pub artist_name: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
}

/// Full replacement of the editable fields (edit dialog submits them all).
#[derive(Debug, Clone)]
pub struct DemandChanges {
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub start_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub due_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub status: Option<DemandStatus>,
}

#[async_trait]
pub trait DemandRepository: Send + Sync {
    async fn list(&self, filter: &DemandFilter, page: Option<Pagination>) -> Result<Vec<demand::Model>, ServiceError>;
    async fn find(&self, id: Uuid) -> Result<Option<demand::Model>, ServiceError>;
    async fn insert(&self, input: NewDemand) -> Result<demand::Model, ServiceError>;
    async fn apply(&self, id: Uuid, changes: DemandChanges) -> Result<demand::Model, ServiceError>;
    async fn set_status(&self, id: Uuid, status: DemandStatus) -> Result<demand::Model, ServiceError>;
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Non-completed demands for a producer with a deadline inside [start, end).
    async fn same_day_due(
        &self,
        producer_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<demand::Model>, ServiceError>;
    /// Whether a producer with this display name exists in the directory.
    async fn producer_exists(&self, display_name: &str) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmDemandRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl DemandRepository for SeaOrmDemandRepository {
    async fn list(&self, filter: &DemandFilter, page: Option<Pagination>) -> Result<Vec<demand::Model>, ServiceError> {
        let mut query = demand::Entity::find().order_by_desc(demand::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(demand::Column::Status.eq(status.as_str()));
        }
        if let Some(producer) = &filter.producer_name {
            query = query.filter(demand::Column::ProducerName.eq(producer.clone()));
        }
        if let Some(artist) = &filter.artist_name {
            query = query.filter(demand::Column::ArtistName.eq(artist.clone()));
        }
        if let Some(after) = filter.created_after {
            query = query.filter(demand::Column::CreatedAt.gte(after.fixed_offset()));
        }
        match page {
            Some(p) => {
                let (page_idx, per_page) = p.normalize();
                query
                    .paginate(&self.db, per_page)
                    .fetch_page(page_idx)
                    .await
                    .map_err(|e| ServiceError::Db(e.to_string()))
            }
            None => query.all(&self.db).await.map_err(|e| ServiceError::Db(e.to_string())),
        }
    }

    async fn find(&self, id: Uuid) -> Result<Option<demand::Model>, ServiceError> {
        demand::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn insert(&self, input: NewDemand) -> Result<demand::Model, ServiceError> {
        Ok(demand::create(&self.db, input).await?)
    }

    async fn apply(&self, id: Uuid, changes: DemandChanges) -> Result<demand::Model, ServiceError> {
        let existing = self
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("demand"))?;
        let mut am: demand::ActiveModel = existing.into();
        am.name = Set(changes.name.trim().to_string());
        am.artist_name = Set(changes.artist_name.and_then(demand::none_if_blank));
        am.description = Set(changes.description.and_then(demand::none_if_blank));
        am.producer_name = Set(changes.producer_name.trim().to_string());
        am.start_at = Set(changes.start_at);
        am.due_at = Set(changes.due_at);
        if let Some(status) = changes.status {
            am.status = Set(status.as_str().to_string());
        }
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn set_status(&self, id: Uuid, status: DemandStatus) -> Result<demand::Model, ServiceError> {
        let existing = self
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("demand"))?;
        let mut am: demand::ActiveModel = existing.into();
        am.status = Set(status.as_str().to_string());
        am.updated_at = Set(Utc::now().into());
        am.update(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(demand::hard_delete(&self.db, id).await?)
    }

    async fn same_day_due(
        &self,
        producer_name: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<demand::Model>, ServiceError> {
        demand::Entity::find()
            .filter(demand::Column::ProducerName.eq(producer_name))
            .filter(demand::Column::DueAt.gte(start.fixed_offset()))
            .filter(demand::Column::DueAt.lt(end.fixed_offset()))
            .filter(demand::Column::Status.ne(DemandStatus::Concluido.as_str()))
            .order_by_asc(demand::Column::DueAt)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))
    }

    async fn producer_exists(&self, display_name: &str) -> Result<bool, ServiceError> {
        crate::directory_service::list_producers(&self.db)
            .await
            .map(|names| names.iter().any(|n| n == display_name))
    }
}

/// In-memory mock for service-level tests.
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockDemandRepository {
        pub demands: Mutex<Vec<demand::Model>>,
        pub producers: Mutex<HashSet<String>>,
    }

    impl MockDemandRepository {
        pub fn with_producers<I: IntoIterator<Item = String>>(names: I) -> Self {
            Self {
                demands: Mutex::new(Vec::new()),
                producers: Mutex::new(names.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl DemandRepository for MockDemandRepository {
        async fn list(&self, filter: &DemandFilter, page: Option<Pagination>) -> Result<Vec<demand::Model>, ServiceError> {
            let mut rows: Vec<_> = self
                .demands
                .lock()
                .unwrap()
                .iter()
                .filter(|d| filter.status.map(|s| d.status == s.as_str()).unwrap_or(true))
                .filter(|d| filter.producer_name.as_deref().map(|p| d.producer_name == p).unwrap_or(true))
                .filter(|d| {
                    filter
                        .artist_name
                        .as_deref()
                        .map(|a| d.artist_name.as_deref() == Some(a))
                        .unwrap_or(true)
                })
                .filter(|d| {
                    filter
                        .created_after
                        .map(|after| d.created_at >= after.fixed_offset())
                        .unwrap_or(true)
                })
                .cloned()
                .collect();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            if let Some(p) = page {
                let (page_idx, per_page) = p.normalize();
                rows = rows
                    .into_iter()
                    .skip((page_idx * per_page) as usize)
                    .take(per_page as usize)
                    .collect();
            }
            Ok(rows)
        }

        async fn find(&self, id: Uuid) -> Result<Option<demand::Model>, ServiceError> {
            Ok(self.demands.lock().unwrap().iter().find(|d| d.id == id).cloned())
        }

        async fn insert(&self, input: NewDemand) -> Result<demand::Model, ServiceError> {
            models::demand::validate_name(&input.name)?;
            models::demand::validate_producer(&input.producer_name)?;
            models::demand::validate_dates(input.start_at.as_ref(), input.due_at.as_ref())?;
            let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();
            let row = demand::Model {
                id: Uuid::new_v4(),
                name: input.name.trim().to_string(),
                artist_name: input.artist_name.and_then(demand::none_if_blank),
                description: input.description.and_then(demand::none_if_blank),
                producer_name: input.producer_name.trim().to_string(),
                status: DemandStatus::Aguardando.as_str().to_string(),
                start_at: input.start_at,
                due_at: input.due_at,
                created_by: input.created_by,
                created_at: now,
                updated_at: now,
            };
            self.demands.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn apply(&self, id: Uuid, changes: DemandChanges) -> Result<demand::Model, ServiceError> {
            let mut rows = self.demands.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| ServiceError::not_found("demand"))?;
            row.name = changes.name.trim().to_string();
            row.artist_name = changes.artist_name.and_then(demand::none_if_blank);
            row.description = changes.description.and_then(demand::none_if_blank);
            row.producer_name = changes.producer_name.trim().to_string();
            row.start_at = changes.start_at;
            row.due_at = changes.due_at;
            if let Some(status) = changes.status {
                row.status = status.as_str().to_string();
            }
            row.updated_at = Utc::now().into();
            Ok(row.clone())
        }

        async fn set_status(&self, id: Uuid, status: DemandStatus) -> Result<demand::Model, ServiceError> {
            let mut rows = self.demands.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| ServiceError::not_found("demand"))?;
            row.status = status.as_str().to_string();
            row.updated_at = Utc::now().into();
            Ok(row.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.demands.lock().unwrap();
            let before = rows.len();
            rows.retain(|d| d.id != id);
            Ok(rows.len() < before)
        }

        async fn same_day_due(
            &self,
            producer_name: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<demand::Model>, ServiceError> {
            Ok(self
                .demands
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.producer_name == producer_name)
                .filter(|d| d.status != DemandStatus::Concluido.as_str())
                .filter(|d| {
                    d.due_at
                        .map(|due| due >= start.fixed_offset() && due < end.fixed_offset())
                        .unwrap_or(false)
                })
                .cloned()
                .collect())
        }

        async fn producer_exists(&self, display_name: &str) -> Result<bool, ServiceError> {
            Ok(self.producers.lock().unwrap().contains(display_name))
        }
    }
}
