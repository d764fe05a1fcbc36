use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::availability_service::{self, AvailabilityView};

use crate::errors::JsonApiError;
use crate::routes::auth::{CurrentUser, ServerState};

#[derive(Debug, Deserialize, Serialize)]
pub struct SlotInput {
    pub date: NaiveDate,
    pub slot_start: NaiveTime,
    pub slot_end: NaiveTime,
}

#[utoipa::path(get, path = "/api/availability", tag = "availability", responses((status = 200, description = "OK")))]
pub async fn list_mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<models::availability::Model>>, JsonApiError> {
    let mine = availability_service::list_my_slots(&state.db, user.id).await?;
    Ok(Json(mine))
}

#[utoipa::path(
    post, path = "/api/availability", tag = "availability",
    request_body = crate::openapi::SlotInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden")
    )
)]
pub async fn add(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<SlotInput>,
) -> Result<(StatusCode, Json<models::availability::Model>), JsonApiError> {
    let created =
        availability_service::add_slot(&state.db, &user.actor(), input.date, input.slot_start, input.slot_end).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete, path = "/api/availability/{id}", tag = "availability",
    params(("id" = Uuid, Path, description = "Slot ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn remove(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    availability_service::delete_slot(&state.db, &user.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/availability/view", tag = "availability", responses((status = 200, description = "OK")))]
pub async fn view(State(state): State<ServerState>) -> Result<Json<Vec<AvailabilityView>>, JsonApiError> {
    let rows = availability_service::list_for_view(&state.db).await?;
    Ok(Json(rows))
}
