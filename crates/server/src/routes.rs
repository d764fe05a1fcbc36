use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

pub mod auth;
pub mod availability;
pub mod deliverables;
pub mod demands;
pub mod setup;
pub mod users;

use self::auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public setup/login surface, the
/// token-guarded API, Swagger docs and the static frontend fallback.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let static_dir = ServeDir::new("frontend").fallback(ServeFile::new("frontend/index.html"));

    // Public routes: health, first-run setup and login
    let public = Router::new()
        .route("/health", get(health))
        .route("/setup/status", get(setup::status))
        .route("/setup/register", post(setup::register))
        .route("/setup/complete", post(setup::complete))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    // Everything else requires a verified token
    let api = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/api/demands", get(demands::list).post(demands::create))
        .route("/api/demands/stats", get(demands::stats))
        .route(
            "/api/demands/:id",
            get(demands::get).put(demands::update).delete(demands::delete),
        )
        .route("/api/demands/:id/status", patch(demands::update_status))
        .route(
            "/api/demands/:id/deliverable",
            get(deliverables::get_for_demand).put(deliverables::upsert),
        )
        .route("/api/deliverables", get(deliverables::list))
        .route("/api/availability", get(availability::list_mine).post(availability::add))
        .route("/api/availability/view", get(availability::view))
        .route("/api/availability/:id", delete(availability::remove))
        .route("/api/producers", get(users::producers))
        .route("/admin/users", get(users::list).post(users::create))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    let docs = SwaggerUi::new("/docs").url("/api-docs/openapi.json", crate::openapi::ApiDoc::openapi());

    public
        .merge(api)
        .merge(docs)
        .fallback_service(static_dir)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
