use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use models::demand::{self, DemandStatus, NewDemand};
use models::user_role::AppRole;

use crate::demand::repository::{DemandChanges, DemandFilter, DemandRepository};
use crate::demand::schedule;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// The authenticated caller, as seen by business rules.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: AppRole,
    pub display_name: String,
}

/// Create request; `confirm_conflict` is the answer to the confirmation
/// prompt shown when the deadline collides with another demand.
#[derive(Debug, Clone)]
pub struct CreateDemand {
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub start_at: Option<DateTime<FixedOffset>>,
    pub due_at: Option<DateTime<FixedOffset>>,
    pub confirm_conflict: bool,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(demand::Model),
    /// The deadline lands on a day already taken by these demands;
    /// nothing was written.
    DueConflict(Vec<demand::Model>),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DemandStats {
    pub aguardando: usize,
    pub em_producao: usize,
    pub concluido: usize,
    pub due_soon: usize,
}

/// Which status changes a role may perform on a demand.
/// Producers walk the pipeline forward on their own demands; requester
/// roles may set any stage, which covers reopening a completed demand.
pub fn status_change_allowed(
    role: AppRole,
    is_assigned_producer: bool,
    current: DemandStatus,
    next: DemandStatus,
) -> bool {
    match role {
        AppRole::Produtor => {
            is_assigned_producer
                && matches!(
                    (current, next),
                    (DemandStatus::Aguardando, DemandStatus::EmProducao)
                        | (DemandStatus::EmProducao, DemandStatus::Concluido)
                )
        }
        AppRole::Atendente | AppRole::Ceo | AppRole::Admin => true,
    }
}

/// Application service encapsulating demand business rules.
pub struct DemandService<R: DemandRepository> {
    repo: Arc<R>,
}

impl<R: DemandRepository> DemandService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(
        &self,
        filter: &DemandFilter,
        page: Option<Pagination>,
    ) -> Result<Vec<demand::Model>, ServiceError> {
        self.repo.list(filter, page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<demand::Model, ServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("demand"))
    }

    /// Status counts plus the due-soon tally for the dashboard cards.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DemandStats, ServiceError> {
        let all = self.repo.list(&DemandFilter::default(), None).await?;
        let count = |status: DemandStatus| all.iter().filter(|d| d.status == status.as_str()).count();
        Ok(DemandStats {
            aguardando: count(DemandStatus::Aguardando),
            em_producao: count(DemandStatus::EmProducao),
            concluido: count(DemandStatus::Concluido),
            due_soon: schedule::count_due_soon(&all, now),
        })
    }

    /// Other non-completed demands of the producer due on the same day.
    pub async fn due_conflicts(
        &self,
        producer_name: &str,
        due_at: &DateTime<FixedOffset>,
    ) -> Result<Vec<demand::Model>, ServiceError> {
        let (start, end) = schedule::day_bounds(due_at);
        self.repo.same_day_due(producer_name, start, end).await
    }

    #[instrument(skip(self, actor, input), fields(producer = %input.producer_name, user = %actor.user_id))]
    pub async fn create(&self, actor: &Actor, input: CreateDemand) -> Result<CreateOutcome, ServiceError> {
        if !actor.role.is_requester() {
            return Err(ServiceError::forbidden("creating demands"));
        }
        demand::validate_name(&input.name)?;
        demand::validate_producer(&input.producer_name)?;
        demand::validate_dates(input.start_at.as_ref(), input.due_at.as_ref())?;
        if !self.repo.producer_exists(input.producer_name.trim()).await? {
            return Err(ServiceError::Validation(format!(
                "unknown producer: {}",
                input.producer_name.trim()
            )));
        }

        if let Some(due) = &input.due_at {
            let conflicts = self.due_conflicts(input.producer_name.trim(), due).await?;
            if !conflicts.is_empty() && !input.confirm_conflict {
                info!(count = conflicts.len(), "due_date_conflict_detected");
                return Ok(CreateOutcome::DueConflict(conflicts));
            }
        }

        let created = self
            .repo
            .insert(NewDemand {
                name: input.name,
                artist_name: input.artist_name,
                description: input.description,
                producer_name: input.producer_name,
                start_at: input.start_at,
                due_at: input.due_at,
                created_by: actor.user_id,
            })
            .await?;
        info!(id = %created.id, "demand_created");
        Ok(CreateOutcome::Created(created))
    }

    /// Full edit of details and dates; only the creator may do this.
    #[instrument(skip(self, actor, changes), fields(demand = %id, user = %actor.user_id))]
    pub async fn update(&self, actor: &Actor, id: Uuid, changes: DemandChanges) -> Result<demand::Model, ServiceError> {
        let existing = self.get(id).await?;
        if existing.created_by != actor.user_id {
            return Err(ServiceError::Forbidden(
                "only the creator can change details and deadlines".into(),
            ));
        }
        demand::validate_name(&changes.name)?;
        demand::validate_producer(&changes.producer_name)?;
        demand::validate_dates(changes.start_at.as_ref(), changes.due_at.as_ref())?;
        if let Some(next) = changes.status {
            let current: DemandStatus = existing.status.parse()?;
            let assigned = existing.producer_name == actor.display_name;
            if !status_change_allowed(actor.role, assigned, current, next) {
                return Err(ServiceError::forbidden("this status change"));
            }
        }
        let updated = self.repo.apply(id, changes).await?;
        info!(id = %updated.id, "demand_updated");
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(demand = %id, user = %actor.user_id, next = %next))]
    pub async fn update_status(&self, actor: &Actor, id: Uuid, next: DemandStatus) -> Result<demand::Model, ServiceError> {
        let existing = self.get(id).await?;
        let current: DemandStatus = existing.status.parse()?;
        let assigned = existing.producer_name == actor.display_name;
        if !status_change_allowed(actor.role, assigned, current, next) {
            return Err(ServiceError::forbidden("this status change"));
        }
        let updated = self.repo.set_status(id, next).await?;
        info!(id = %updated.id, from = %current, to = %next, "demand_status_changed");
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(demand = %id, user = %actor.user_id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        if !actor.role.is_requester() {
            return Err(ServiceError::forbidden("deleting demands"));
        }
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found("demand"));
        }
        info!(id = %id, "demand_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::repository::mock::MockDemandRepository;
    use chrono::{Duration, TimeZone};

    fn service() -> DemandService<MockDemandRepository> {
        let repo = MockDemandRepository::with_producers(["Mhad".to_string(), "Felipe 1x".to_string()]);
        DemandService::new(Arc::new(repo))
    }

    fn requester() -> Actor {
        Actor { user_id: Uuid::new_v4(), role: AppRole::Atendente, display_name: "Maria".into() }
    }

    fn producer(name: &str) -> Actor {
        Actor { user_id: Uuid::new_v4(), role: AppRole::Produtor, display_name: name.into() }
    }

    fn create_input(producer: &str, due_at: Option<DateTime<FixedOffset>>) -> CreateDemand {
        CreateDemand {
            name: "Beat trap".into(),
            artist_name: None,
            description: None,
            producer_name: producer.into(),
            start_at: None,
            due_at,
            confirm_conflict: false,
        }
    }

    fn due(day: u32, hour: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap().fixed_offset()
    }

    async fn created(svc: &DemandService<MockDemandRepository>, input: CreateDemand) -> demand::Model {
        match svc.create(&requester(), input).await.unwrap() {
            CreateOutcome::Created(m) => m,
            CreateOutcome::DueConflict(_) => panic!("unexpected conflict"),
        }
    }

    #[tokio::test]
    async fn producer_cannot_create_demands() {
        let svc = service();
        let res = svc.create(&producer("Mhad"), create_input("Mhad", None)).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn unknown_producer_is_rejected() {
        let svc = service();
        let res = svc.create(&requester(), create_input("Zezinho", None)).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn same_day_deadline_reports_conflict_until_confirmed() {
        let svc = service();
        created(&svc, create_input("Mhad", Some(due(10, 9)))).await;

        // Same producer, same day, different hour: conflict
        let outcome = svc.create(&requester(), create_input("Mhad", Some(due(10, 17)))).await.unwrap();
        let conflicts = match outcome {
            CreateOutcome::DueConflict(c) => c,
            CreateOutcome::Created(_) => panic!("expected conflict"),
        };
        assert_eq!(conflicts.len(), 1);

        // Confirmed: goes through
        let mut confirmed = create_input("Mhad", Some(due(10, 17)));
        confirmed.confirm_conflict = true;
        let outcome = svc.create(&requester(), confirmed).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn other_producer_or_day_does_not_conflict() {
        let svc = service();
        created(&svc, create_input("Mhad", Some(due(10, 9)))).await;

        let outcome = svc.create(&requester(), create_input("Felipe 1x", Some(due(10, 9)))).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));

        let outcome = svc.create(&requester(), create_input("Mhad", Some(due(11, 9)))).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn completed_demands_do_not_conflict() {
        let svc = service();
        let first = created(&svc, create_input("Mhad", Some(due(10, 9)))).await;
        svc.update_status(&requester(), first.id, DemandStatus::Concluido).await.unwrap();

        let outcome = svc.create(&requester(), create_input("Mhad", Some(due(10, 17)))).await.unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    #[tokio::test]
    async fn producer_walks_pipeline_forward_on_own_demand() {
        let svc = service();
        let d = created(&svc, create_input("Mhad", None)).await;
        let mhad = producer("Mhad");

        let d = svc.update_status(&mhad, d.id, DemandStatus::EmProducao).await.unwrap();
        assert_eq!(d.status, "em_producao");
        let d = svc.update_status(&mhad, d.id, DemandStatus::Concluido).await.unwrap();
        assert_eq!(d.status, "concluido");
    }

    #[tokio::test]
    async fn producer_cannot_skip_or_touch_other_producers_demands() {
        let svc = service();
        let d = created(&svc, create_input("Mhad", None)).await;

        // Skipping aguardando -> concluido is not a forward step
        let res = svc.update_status(&producer("Mhad"), d.id, DemandStatus::Concluido).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));

        // Someone else's demand
        let res = svc.update_status(&producer("Felipe 1x"), d.id, DemandStatus::EmProducao).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn requester_can_reopen_completed_demand() {
        let svc = service();
        let d = created(&svc, create_input("Mhad", None)).await;
        svc.update_status(&requester(), d.id, DemandStatus::Concluido).await.unwrap();
        let d = svc.update_status(&requester(), d.id, DemandStatus::EmProducao).await.unwrap();
        assert_eq!(d.status, "em_producao");
    }

    #[tokio::test]
    async fn only_creator_edits_details() {
        let svc = service();
        let creator = requester();
        let outcome = svc.create(&creator, create_input("Mhad", None)).await.unwrap();
        let d = match outcome {
            CreateOutcome::Created(m) => m,
            _ => panic!("expected created"),
        };

        let changes = DemandChanges {
            name: "Beat trap v2".into(),
            artist_name: Some("MC Lua".into()),
            description: None,
            producer_name: "Felipe 1x".into(),
            start_at: None,
            due_at: None,
            status: None,
        };

        let res = svc.update(&requester(), d.id, changes.clone()).await;
        assert!(matches!(res, Err(ServiceError::Forbidden(_))));

        let updated = svc.update(&creator, d.id, changes).await.unwrap();
        assert_eq!(updated.name, "Beat trap v2");
        assert_eq!(updated.producer_name, "Felipe 1x");
    }

    #[tokio::test]
    async fn edit_rejects_inverted_dates() {
        let svc = service();
        let creator = requester();
        let outcome = svc.create(&creator, create_input("Mhad", None)).await.unwrap();
        let d = match outcome {
            CreateOutcome::Created(m) => m,
            _ => panic!("expected created"),
        };
        let changes = DemandChanges {
            name: "Beat trap".into(),
            artist_name: None,
            description: None,
            producer_name: "Mhad".into(),
            start_at: Some(due(12, 10)),
            due_at: Some(due(12, 10) - Duration::hours(2)),
            status: None,
        };
        assert!(matches!(svc.update(&creator, d.id, changes).await, Err(ServiceError::Model(_))));
    }

    #[tokio::test]
    async fn delete_is_requester_only_and_reports_missing() {
        let svc = service();
        let d = created(&svc, create_input("Mhad", None)).await;

        assert!(matches!(
            svc.delete(&producer("Mhad"), d.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        svc.delete(&requester(), d.id).await.unwrap();
        assert!(matches!(
            svc.delete(&requester(), d.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_filters_by_artist_for_the_report_view() {
        let svc = service();
        let mut with_artist = create_input("Mhad", None);
        with_artist.artist_name = Some("MC Lua".into());
        svc.create(&requester(), with_artist).await.unwrap();
        created(&svc, create_input("Mhad", None)).await;

        let filter = DemandFilter { artist_name: Some("MC Lua".into()), ..Default::default() };
        let listed = svc.list(&filter, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].artist_name.as_deref(), Some("MC Lua"));
    }

    #[tokio::test]
    async fn stats_count_statuses_and_due_soon() {
        let svc = service();
        let now = Utc::now();
        created(&svc, create_input("Mhad", Some((now + Duration::hours(5)).fixed_offset()))).await;
        let b = created(&svc, create_input("Felipe 1x", None)).await;
        svc.update_status(&requester(), b.id, DemandStatus::Concluido).await.unwrap();

        let stats = svc.stats(now).await.unwrap();
        assert_eq!(stats.aguardando, 1);
        assert_eq!(stats.concluido, 1);
        assert_eq!(stats.em_producao, 0);
        assert_eq!(stats.due_soon, 1);
    }
}
