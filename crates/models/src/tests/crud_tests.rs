use crate::db::connect;
use crate::{account, availability, app_config, deliverable, demand, profile, user_role};
use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

/// Setup test database with migrations
async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn unique_email() -> String {
    format!("test_{}@example.com", Uuid::new_v4())
}

#[tokio::test]
async fn test_account_profile_role_crud() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let email = unique_email();
    let acc = account::create(&db, &email).await?;
    assert_eq!(acc.email, email);
    assert_eq!(acc.status, "active");

    let found = account::find_by_email(&db, &email).await?;
    assert_eq!(found.map(|a| a.id), Some(acc.id));

    let prof = profile::create(&db, acc.id, "Maria Atendente").await?;
    assert_eq!(prof.display_name, "Maria Atendente");

    let updated = profile::upsert_display_name(&db, acc.id, "Maria A.").await?;
    assert_eq!(updated.display_name, "Maria A.");

    user_role::set_role(&db, acc.id, user_role::AppRole::Atendente).await?;
    assert_eq!(user_role::find_role(&db, acc.id).await?, Some(user_role::AppRole::Atendente));

    // set_role replaces, never stacks
    user_role::set_role(&db, acc.id, user_role::AppRole::Produtor).await?;
    assert_eq!(user_role::find_role(&db, acc.id).await?, Some(user_role::AppRole::Produtor));

    account::hard_delete(&db, acc.id).await?;
    assert!(account::find_by_email(&db, &email).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_demand_create_and_delete() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let creator = account::create(&db, &unique_email()).await?;
    let created = demand::create(
        &db,
        demand::NewDemand {
            name: "Beat trap".into(),
            artist_name: Some("  MC Lua ".into()),
            description: None,
            producer_name: "Mhad".into(),
            start_at: None,
            due_at: None,
            created_by: creator.id,
        },
    )
    .await?;
    assert_eq!(created.status, "aguardando");
    assert_eq!(created.artist_name.as_deref(), Some("MC Lua"));

    let blank_name = demand::create(
        &db,
        demand::NewDemand {
            name: "  ".into(),
            artist_name: None,
            description: None,
            producer_name: "Mhad".into(),
            start_at: None,
            due_at: None,
            created_by: creator.id,
        },
    )
    .await;
    assert!(blank_name.is_err());

    assert!(demand::hard_delete(&db, created.id).await?);
    assert!(!demand::hard_delete(&db, created.id).await?);

    account::hard_delete(&db, creator.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_deliverable_upsert_merges_fields() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let creator = account::create(&db, &unique_email()).await?;
    let d = demand::create(
        &db,
        demand::NewDemand {
            name: "Mix final".into(),
            artist_name: None,
            description: None,
            producer_name: "Felipe 1x".into(),
            start_at: None,
            due_at: None,
            created_by: creator.id,
        },
    )
    .await?;

    // First write: file only
    let first = deliverable::upsert(
        &db,
        d.id,
        deliverable::DeliverablePatch {
            storage_path: Some(format!("{}/beat.wav", d.id)),
            file_name: Some("beat.wav".into()),
            comments: None,
        },
        creator.id,
    )
    .await?;
    assert!(first.storage_path.is_some());
    assert!(first.comments.is_none());

    // Second write: comments only, file fields untouched
    let second = deliverable::upsert(
        &db,
        d.id,
        deliverable::DeliverablePatch {
            storage_path: None,
            file_name: None,
            comments: Some("faltou o grave".into()),
        },
        creator.id,
    )
    .await?;
    assert_eq!(second.id, first.id);
    assert_eq!(second.file_name.as_deref(), Some("beat.wav"));
    assert_eq!(second.comments.as_deref(), Some("faltou o grave"));

    account::hard_delete(&db, creator.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_availability_rejects_duplicate_slot() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let producer = account::create(&db, &unique_email()).await?;
    let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();

    let slot = availability::create(&db, producer.id, date, eight, noon).await?;
    assert!(availability::create(&db, producer.id, date, eight, noon).await.is_err());

    let mine = availability::list_for_user(&db, producer.id).await?;
    assert_eq!(mine.len(), 1);

    assert!(availability::hard_delete(&db, slot.id).await?);
    account::hard_delete(&db, producer.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_app_config_roundtrip() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;

    let key = format!("test_key_{}", Uuid::new_v4());
    assert!(app_config::get(&db, &key).await?.is_none());

    app_config::set(&db, &key, serde_json::json!(true)).await?;
    assert_eq!(app_config::get(&db, &key).await?, Some(serde_json::json!(true)));

    app_config::set(&db, &key, serde_json::json!(false)).await?;
    assert_eq!(app_config::get(&db, &key).await?, Some(serde_json::json!(false)));
    Ok(())
}
