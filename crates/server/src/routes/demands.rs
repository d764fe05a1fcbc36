use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::demand::DemandStatus;
use service::demand::repository::{DemandChanges, DemandFilter, SeaOrmDemandRepository};
use service::demand::schedule;
use service::demand::service::{CreateDemand, CreateOutcome, DemandService, DemandStats};
use service::pagination::Pagination;

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

pub fn demand_service(state: &ServerState) -> DemandService<SeaOrmDemandRepository> {
    DemandService::new(Arc::new(SeaOrmDemandRepository { db: state.db.clone() }))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// Pipeline stage filter (aguardando / em_producao / concluido)
    pub status: Option<String>,
    /// Producer display name filter
    pub producer: Option<String>,
    /// Artist name filter (per-artist report)
    pub artist: Option<String>,
    /// Period preset over created_at: "7", "30" or "month"
    pub period: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateDemandInput {
    pub name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub producer_name: String,
    #[serde(default)]
    pub start_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub due_at: Option<DateTime<FixedOffset>>,
    /// Answer to the same-day conflict prompt; false surfaces conflicts as 409
    #[serde(default)]
    pub confirm_conflict: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateDemandInput {
    pub name: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub producer_name: String,
    #[serde(default)]
    pub start_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub due_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub status: Option<DemandStatus>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StatusChangeInput {
    pub status: DemandStatus,
}

fn parse_filter(q: &ListQuery) -> Result<DemandFilter, JsonApiError> {
    let status = match q.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(raw.parse::<DemandStatus>().map_err(|e| {
            JsonApiError::new(StatusCode::BAD_REQUEST, "Validation Error", Some(e.to_string()))
        })?),
    };
    let producer = match q.producer.as_deref() {
        None | Some("all") => None,
        Some(name) => Some(name.to_string()),
    };
    let artist = q.artist.as_deref().map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
    let created_after = q
        .period
        .as_deref()
        .and_then(|preset| schedule::period_start(preset, Utc::now()));
    Ok(DemandFilter { status, producer_name: producer, artist_name: artist, created_after })
}

#[utoipa::path(
    get, path = "/api/demands", tag = "demands",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK"),
        (status = 400, description = "Invalid Filter")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<models::demand::Model>>, JsonApiError> {
    let filter = parse_filter(&q)?;
    let page = match (q.page, q.per_page) {
        (None, None) => None,
        (page, per_page) => Some(Pagination {
            page: page.unwrap_or(1),
            per_page: per_page.unwrap_or(Pagination::default().per_page),
        }),
    };
    let listed = demand_service(&state).list(&filter, page).await?;
    info!(count = listed.len(), "list demands");
    Ok(Json(listed))
}

#[utoipa::path(get, path = "/api/demands/stats", tag = "demands", responses((status = 200, description = "OK")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<DemandStats>, JsonApiError> {
    let stats = demand_service(&state).stats(Utc::now()).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    post, path = "/api/demands", tag = "demands",
    request_body = crate::openapi::CreateDemandInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Due Date Conflict")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<CreateDemandInput>,
) -> Result<(StatusCode, Json<models::demand::Model>), axum::response::Response> {
    use axum::response::IntoResponse;
    let outcome = demand_service(&state)
        .create(
            &user.actor(),
            CreateDemand {
                name: input.name,
                artist_name: input.artist_name,
                description: input.description,
                producer_name: input.producer_name,
                start_at: input.start_at,
                due_at: input.due_at,
                confirm_conflict: input.confirm_conflict,
            },
        )
        .await
        .map_err(|e| JsonApiError::from(e).into_response())?;

    match outcome {
        CreateOutcome::Created(m) => Ok((StatusCode::CREATED, Json(m))),
        CreateOutcome::DueConflict(conflicts) => {
            // The confirmation prompt: nothing was written, the client may
            // retry with confirm_conflict set.
            let body = serde_json::json!({
                "error": "Due Date Conflict",
                "detail": "another demand for this producer is due on the same day",
                "conflicts": conflicts,
            });
            Err((StatusCode::CONFLICT, Json(body)).into_response())
        }
    }
}

#[utoipa::path(
    get, path = "/api/demands/{id}", tag = "demands",
    params(("id" = Uuid, Path, description = "Demand ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::demand::Model>, JsonApiError> {
    let found = demand_service(&state).get(id).await?;
    Ok(Json(found))
}

#[utoipa::path(
    put, path = "/api/demands/{id}", tag = "demands",
    params(("id" = Uuid, Path, description = "Demand ID")),
    request_body = crate::openapi::UpdateDemandInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDemandInput>,
) -> Result<Json<models::demand::Model>, JsonApiError> {
    let updated = demand_service(&state)
        .update(
            &user.actor(),
            id,
            DemandChanges {
                name: input.name,
                artist_name: input.artist_name,
                description: input.description,
                producer_name: input.producer_name,
                start_at: input.start_at,
                due_at: input.due_at,
                status: input.status,
            },
        )
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    patch, path = "/api/demands/{id}/status", tag = "demands",
    params(("id" = Uuid, Path, description = "Demand ID")),
    request_body = crate::openapi::StatusChangeInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusChangeInput>,
) -> Result<Json<models::demand::Model>, JsonApiError> {
    let updated = demand_service(&state)
        .update_status(&user.actor(), id, input.status)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    delete, path = "/api/demands/{id}", tag = "demands",
    params(("id" = Uuid, Path, description = "Demand ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    demand_service(&state).delete(&user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
