use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::deliverable_service;

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Deserialize, Serialize)]
pub struct DeliverableInput {
    /// Original file name; the stored key is derived server-side
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

/// All deliverable records, matched to demands client-side.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<models::deliverable::Model>>, JsonApiError> {
    let all = deliverable_service::list_all(&state.db).await?;
    Ok(Json(all))
}

#[utoipa::path(
    get, path = "/api/demands/{id}/deliverable", tag = "deliverables",
    params(("id" = Uuid, Path, description = "Demand ID")),
    responses(
        (status = 200, description = "OK"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_for_demand(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<models::deliverable::Model>, JsonApiError> {
    match deliverable_service::get_for_demand(&state.db, id).await? {
        Some(d) => Ok(Json(d)),
        None => Err(JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("no deliverable yet".into()))),
    }
}

#[utoipa::path(
    put, path = "/api/demands/{id}/deliverable", tag = "deliverables",
    params(("id" = Uuid, Path, description = "Demand ID")),
    request_body = crate::openapi::DeliverableInputDoc,
    responses(
        (status = 200, description = "Upserted"),
        (status = 404, description = "Demand Not Found")
    )
)]
pub async fn upsert(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<DeliverableInput>,
) -> Result<Json<models::deliverable::Model>, JsonApiError> {
    let saved = deliverable_service::upsert_for_demand(&state.db, id, user.id, input.file_name, input.comments).await?;
    Ok(Json(saved))
}
