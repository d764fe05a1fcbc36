//! Privileged user management plus the producer directory read.

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::user_role::AppRole;
use service::auth::domain::RegisterInput;
use service::directory_service::{self, UserSummary};

use crate::errors::JsonApiError;
use crate::routes::auth::{auth_service, CurrentUser, ServerState};

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: AppRole,
}

#[derive(Serialize)]
pub struct CreateUserOutput {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: AppRole,
}

#[utoipa::path(
    post, path = "/admin/users", tag = "admin",
    request_body = crate::openapi::CreateUserInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Conflict")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<CreateUserOutput>), JsonApiError> {
    if user.role != AppRole::Admin {
        return Err(JsonApiError::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            Some("only administrators can create users".into()),
        ));
    }
    let svc = auth_service(&state);
    let created = svc
        .register(RegisterInput {
            email: input.email,
            display_name: input.display_name,
            password: input.password,
            role: input.role,
        })
        .await?;
    info!(id = %created.id, role = %created.role, by = %user.id, "user_created_by_admin");
    Ok((
        StatusCode::CREATED,
        Json(CreateUserOutput {
            id: created.id,
            email: created.email,
            display_name: created.display_name,
            role: created.role,
        }),
    ))
}

#[utoipa::path(get, path = "/admin/users", tag = "admin", responses((status = 200, description = "OK"), (status = 403, description = "Forbidden")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<UserSummary>>, JsonApiError> {
    if !matches!(user.role, AppRole::Admin | AppRole::Ceo) {
        return Err(JsonApiError::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            Some("only administrators can list users".into()),
        ));
    }
    let users = directory_service::list_users(&state.db).await?;
    Ok(Json(users))
}

#[utoipa::path(get, path = "/api/producers", tag = "admin", responses((status = 200, description = "OK")))]
pub async fn producers(State(state): State<ServerState>) -> Result<Json<Vec<String>>, JsonApiError> {
    let names = directory_service::list_producers(&state.db).await?;
    Ok(Json(names))
}
