use utoipa::OpenApi;
use utoipa::ToSchema;

// Doc-only request bodies; dates and times travel as RFC 3339 strings.

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct SetupRegisterRequest { pub email: String, pub display_name: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CreateUserInputDoc {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// atendente | produtor | ceo | admin
    pub role: String,
}

#[derive(utoipa::ToSchema)]
pub struct CreateDemandInputDoc {
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub start_at: Option<String>,
    pub due_at: Option<String>,
    pub confirm_conflict: bool,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateDemandInputDoc {
    pub name: String,
    pub artist_name: Option<String>,
    pub description: Option<String>,
    pub producer_name: String,
    pub start_at: Option<String>,
    pub due_at: Option<String>,
    /// aguardando | em_producao | concluido
    pub status: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct StatusChangeInputDoc {
    /// aguardando | em_producao | concluido
    pub status: String,
}

#[derive(utoipa::ToSchema)]
pub struct DeliverableInputDoc {
    pub file_name: Option<String>,
    pub comments: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct SlotInputDoc {
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM:SS
    pub slot_start: String,
    /// HH:MM:SS
    pub slot_end: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::setup::status,
        crate::routes::setup::register,
        crate::routes::setup::complete,
        crate::routes::demands::list,
        crate::routes::demands::stats,
        crate::routes::demands::create,
        crate::routes::demands::get,
        crate::routes::demands::update,
        crate::routes::demands::update_status,
        crate::routes::demands::delete,
        crate::routes::deliverables::get_for_demand,
        crate::routes::deliverables::upsert,
        crate::routes::availability::list_mine,
        crate::routes::availability::add,
        crate::routes::availability::remove,
        crate::routes::availability::view,
        crate::routes::users::create,
        crate::routes::users::list,
        crate::routes::users::producers,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            SetupRegisterRequest,
            CreateUserInputDoc,
            CreateDemandInputDoc,
            UpdateDemandInputDoc,
            StatusChangeInputDoc,
            DeliverableInputDoc,
            SlotInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "setup"),
        (name = "demands"),
        (name = "deliverables"),
        (name = "availability"),
        (name = "admin"),
    )
)]
pub struct ApiDoc;
