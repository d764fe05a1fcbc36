//! First-run bootstrap: expose the setup flag, accept the initial admin
//! account while it is unset, and mark the instance configured.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::user_role::AppRole;
use service::auth::domain::RegisterInput;
use service::setup_service;

use crate::errors::JsonApiError;
use crate::routes::auth::{auth_service, ServerState};

#[derive(Serialize)]
pub struct SetupStatus {
    pub complete: bool,
}

#[derive(Deserialize)]
pub struct SetupRegisterInput {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SetupRegisterOutput {
    pub user_id: Uuid,
}

#[utoipa::path(get, path = "/setup/status", tag = "setup", responses((status = 200, description = "OK")))]
pub async fn status(State(state): State<ServerState>) -> Result<Json<SetupStatus>, JsonApiError> {
    let complete = setup_service::is_complete(&state.db).await?;
    Ok(Json(SetupStatus { complete }))
}

#[utoipa::path(post, path = "/setup/register", tag = "setup", request_body = crate::openapi::SetupRegisterRequest, responses((status = 201, description = "Admin Created"), (status = 409, description = "Setup Already Complete")))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<SetupRegisterInput>,
) -> Result<(StatusCode, Json<SetupRegisterOutput>), JsonApiError> {
    if setup_service::is_complete(&state.db).await? {
        return Err(JsonApiError::new(
            StatusCode::CONFLICT,
            "Setup Already Complete",
            Some("create further accounts from the admin panel".into()),
        ));
    }
    let svc = auth_service(&state);
    let user = svc
        .register(RegisterInput {
            email: input.email,
            display_name: input.display_name,
            password: input.password,
            role: AppRole::Admin,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(SetupRegisterOutput { user_id: user.id })))
}

#[utoipa::path(post, path = "/setup/complete", tag = "setup", responses((status = 204, description = "Marked Complete")))]
pub async fn complete(State(state): State<ServerState>) -> Result<StatusCode, JsonApiError> {
    setup_service::mark_complete(&state.db).await?;
    Ok(StatusCode::NO_CONTENT)
}
