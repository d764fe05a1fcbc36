//! End-to-end demand pipeline through the router: role gates, status
//! transitions, the same-day conflict prompt, deliverables and availability.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use models::user_role::AppRole;
use server::routes::{self, auth};
use service::auth::domain::RegisterInput;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

const PASSWORD: &str = "S3curePass!";

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

struct TestApp {
    app: Router,
    db: sea_orm::DatabaseConnection,
}

async fn build_app() -> anyhow::Result<TestApp> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = auth::ServerState {
        db: db.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into(), token_ttl_hours: 12 },
    };
    Ok(TestApp { app: routes::build_router(cors(), state), db })
}

/// Seed an account directly through the service layer, then log in over
/// HTTP to get a real token.
async fn seed_user(harness: &mut TestApp, display_name: &str, role: AppRole) -> anyhow::Result<String> {
    let svc = AuthService::new(
        Arc::new(SeaOrmAuthRepository { db: harness.db.clone() }),
        AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() },
    );
    let email = format!("{}_{}@example.com", role, Uuid::new_v4());
    svc.register(RegisterInput {
        email: email.clone(),
        display_name: display_name.to_string(),
        password: PASSWORD.into(),
        role,
    })
    .await?;

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "email": email,
            "password": PASSWORD,
        }))?))?;
    let resp = harness.app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    Ok(body["token"].as_str().expect("login token").to_string())
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn authed(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v).expect("serialize body")))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    }
}

#[tokio::test]
async fn test_demand_pipeline_and_conflict_prompt() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut h = build_app().await?;

    let marker = Uuid::new_v4().simple().to_string();
    let producer_name = format!("Prod {}", marker);
    let attendant_token = seed_user(&mut h, &format!("Atend {}", marker), AppRole::Atendente).await?;
    let producer_token = seed_user(&mut h, &producer_name, AppRole::Produtor).await?;

    // Producer shows up in the directory
    let resp = h.app.call(authed("GET", "/api/producers", &attendant_token, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let producers = body_json(resp).await?;
    assert!(producers.as_array().unwrap().iter().any(|n| n == &json!(producer_name)));

    // Producer cannot create demands
    let create_body = json!({ "name": "Beat trap", "producer_name": producer_name });
    let resp = h.app.call(authed("POST", "/api/demands", &producer_token, Some(create_body.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Requester can
    let resp = h.app.call(authed("POST", "/api/demands", &attendant_token, Some(create_body))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let demand = body_json(resp).await?;
    assert_eq!(demand["status"], json!("aguardando"));
    let demand_id = demand["id"].as_str().unwrap().to_string();

    // Producer walks the pipeline forward
    let resp = h.app.call(authed(
        "PATCH",
        &format!("/api/demands/{}/status", demand_id),
        &producer_token,
        Some(json!({ "status": "em_producao" })),
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = h.app.call(authed(
        "PATCH",
        &format!("/api/demands/{}/status", demand_id),
        &producer_token,
        Some(json!({ "status": "concluido" })),
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // Producer cannot reopen; the requester can
    let reopen = json!({ "status": "em_producao" });
    let resp = h.app.call(authed(
        "PATCH",
        &format!("/api/demands/{}/status", demand_id),
        &producer_token,
        Some(reopen.clone()),
    )).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = h.app.call(authed(
        "PATCH",
        &format!("/api/demands/{}/status", demand_id),
        &attendant_token,
        Some(reopen),
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    // Same-day deadline conflict: first demand with a due date goes in,
    // the second gets the 409 prompt, confirmation goes through.
    let due_first = json!({
        "name": "Mix A", "producer_name": producer_name,
        "due_at": "2031-03-10T09:00:00Z",
    });
    let resp = h.app.call(authed("POST", "/api/demands", &attendant_token, Some(due_first))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let due_second = json!({
        "name": "Mix B", "producer_name": producer_name,
        "due_at": "2031-03-10T17:00:00Z",
    });
    let resp = h.app.call(authed("POST", "/api/demands", &attendant_token, Some(due_second.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let conflict = body_json(resp).await?;
    assert!(conflict["conflicts"].as_array().map(|c| !c.is_empty()).unwrap_or(false));

    let mut confirmed = due_second;
    confirmed["confirm_conflict"] = json!(true);
    let resp = h.app.call(authed("POST", "/api/demands", &attendant_token, Some(confirmed))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Listing with the producer filter sees at least the three demands
    let resp = h.app.call(authed(
        "GET",
        &format!("/api/demands?producer={}", urlencode(&producer_name)),
        &attendant_token,
        None,
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = body_json(resp).await?;
    assert!(listed.as_array().unwrap().len() >= 3);

    // Stats endpoint responds with the status tallies
    let resp = h.app.call(authed("GET", "/api/demands/stats", &attendant_token, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = body_json(resp).await?;
    assert!(stats["aguardando"].is_number());

    Ok(())
}

#[tokio::test]
async fn test_deliverable_and_availability_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut h = build_app().await?;

    let marker = Uuid::new_v4().simple().to_string();
    let producer_name = format!("Prod {}", marker);
    let attendant_token = seed_user(&mut h, &format!("Atend {}", marker), AppRole::Atendente).await?;
    let producer_token = seed_user(&mut h, &producer_name, AppRole::Produtor).await?;

    let resp = h.app.call(authed(
        "POST",
        "/api/demands",
        &attendant_token,
        Some(json!({ "name": "Master final", "producer_name": producer_name })),
    )).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let demand = body_json(resp).await?;
    let demand_id = demand["id"].as_str().unwrap().to_string();

    // No deliverable yet
    let resp = h.app.call(authed(
        "GET",
        &format!("/api/demands/{}/deliverable", demand_id),
        &producer_token,
        None,
    )).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Producer attaches a file; the storage key is sanitized
    let resp = h.app.call(authed(
        "PUT",
        &format!("/api/demands/{}/deliverable", demand_id),
        &producer_token,
        Some(json!({ "file_name": "meu beat final.wav" })),
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let deliverable = body_json(resp).await?;
    assert_eq!(
        deliverable["storage_path"],
        json!(format!("{}/meu-beat-final.wav", demand_id))
    );

    // Comments merge without losing the file
    let resp = h.app.call(authed(
        "PUT",
        &format!("/api/demands/{}/deliverable", demand_id),
        &attendant_token,
        Some(json!({ "comments": "subir o vocal" })),
    )).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let deliverable = body_json(resp).await?;
    assert_eq!(deliverable["file_name"], json!("meu beat final.wav"));
    assert_eq!(deliverable["comments"], json!("subir o vocal"));

    // Availability: producers only
    let slot = json!({ "date": "2031-03-12", "slot_start": "08:00:00", "slot_end": "12:00:00" });
    let resp = h.app.call(authed("POST", "/api/availability", &attendant_token, Some(slot.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = h.app.call(authed("POST", "/api/availability", &producer_token, Some(slot.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created_slot = body_json(resp).await?;
    let slot_id = created_slot["id"].as_str().unwrap().to_string();

    // Duplicate slot is rejected
    let resp = h.app.call(authed("POST", "/api/availability", &producer_token, Some(slot))).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The shared view carries the display name
    let resp = h.app.call(authed("GET", "/api/availability/view", &attendant_token, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let view = body_json(resp).await?;
    assert!(view.as_array().unwrap().iter().any(|r| r["producer_name"] == json!(producer_name)));

    // Only the owner removes a slot
    let resp = h.app.call(authed(
        "DELETE",
        &format!("/api/availability/{}", slot_id),
        &attendant_token,
        None,
    )).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = h.app.call(authed(
        "DELETE",
        &format!("/api/availability/{}", slot_id),
        &producer_token,
        None,
    )).await?;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_admin_gate_on_user_management() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let mut h = build_app().await?;

    let marker = Uuid::new_v4().simple().to_string();
    let attendant_token = seed_user(&mut h, &format!("Atend {}", marker), AppRole::Atendente).await?;
    let admin_token = seed_user(&mut h, &format!("Admin {}", marker), AppRole::Admin).await?;

    let new_user = json!({
        "email": format!("novo_{}@example.com", marker),
        "password": "S3curePass!",
        "display_name": format!("Novo {}", marker),
        "role": "produtor",
    });

    // Non-admin callers are refused
    let resp = h.app.call(authed("POST", "/admin/users", &attendant_token, Some(new_user.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = h.app.call(authed("POST", "/admin/users", &admin_token, Some(new_user.clone()))).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await?;
    assert_eq!(created["role"], json!("produtor"));

    // Duplicate email conflicts
    let resp = h.app.call(authed("POST", "/admin/users", &admin_token, Some(new_user))).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Listing is admin/ceo only
    let resp = h.app.call(authed("GET", "/admin/users", &attendant_token, None)).await?;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = h.app.call(authed("GET", "/admin/users", &admin_token, None)).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let users = body_json(resp).await?;
    assert!(users.as_array().unwrap().iter().any(|u| u["display_name"] == json!(format!("Novo {}", marker))));

    Ok(())
}

/// Minimal percent-encoding for the space in producer display names.
fn urlencode(s: &str) -> String {
    s.replace(' ', "%20")
}
