#![allow(unused)]
//! PostgreSQL store tests.
//!
//! Skipped unless `VERISL__DATABASE__TEST_DATABASE_URL` points at a database
//! the tests may migrate and write to.

use verisl::{
    config::DatabaseConfig,
    db::{self, BusinessStore, PostgresBusinessStore},
    models::{NewBusiness, Verification},
    Error,
};

async fn test_store() -> anyhow::Result<Option<PostgresBusinessStore>> {
    let Ok(url) = std::env::var("VERISL__DATABASE__TEST_DATABASE_URL") else {
        eprintln!("VERISL__DATABASE__TEST_DATABASE_URL not set; skipping PostgreSQL test");
        return Ok(None);
    };
    let config = verisl::Config::defaults()?.database;
    let pool = db::connect(&config, &url).await?;
    db::run_migrations(&pool).await?;
    Ok(Some(PostgresBusinessStore::new(pool)))
}

/// Registration numbers unique per test run so tests can share one database.
fn unique_reg(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn insert_get_and_duplicate() -> anyhow::Result<()> {
    let Some(store) = test_store().await? else {
        return Ok(());
    };
    store.health_check().await?;

    let reg = unique_reg("pg-dup");
    let business = store
        .insert(NewBusiness::new("Postgres Acme", reg.clone(), "Jane"))
        .await?;
    assert_eq!(business.registration_number, reg.to_uppercase());
    assert!(!business.verified);

    let fetched = store.get(&business.id).await?.unwrap();
    assert_eq!(fetched.id, business.id);

    let by_reg = store.find_by_registration_number(&reg).await?.unwrap();
    assert_eq!(by_reg.id, business.id);

    let err = store
        .insert(NewBusiness::new("Again", reg.to_lowercase(), "John"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateRegistration { .. }), "{err:?}");

    assert!(store.get("nonexistent-id").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn verification_updates_one_row() -> anyhow::Result<()> {
    let Some(store) = test_store().await? else {
        return Ok(());
    };

    let business = store
        .insert(NewBusiness::new("Postgres Verify", unique_reg("pg-ver"), "Jane"))
        .await?;

    let verified = store
        .set_verification(
            &business.id,
            Some(Verification {
                verified_at: chrono::Utc::now(),
                verified_by: "admin-pg".into(),
            }),
        )
        .await?
        .unwrap();
    assert!(verified.verified);
    assert_eq!(verified.verified_by.as_deref(), Some("admin-pg"));
    assert!(verified.updated_at >= business.updated_at);

    let cleared = store.set_verification(&business.id, None).await?.unwrap();
    assert!(!cleared.verified);
    assert!(cleared.verified_at.is_none());
    assert!(cleared.verified_by.is_none());

    assert!(store
        .set_verification("nonexistent-id", None)
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn name_search_escapes_wildcards() -> anyhow::Result<()> {
    let Some(store) = test_store().await? else {
        return Ok(());
    };

    let marker = uuid::Uuid::new_v4().simple().to_string();
    store
        .insert(NewBusiness::new(format!("{marker} 50% Off"), unique_reg("pg-like"), "O"))
        .await?;
    store
        .insert(NewBusiness::new(format!("{marker} 500 Off"), unique_reg("pg-like"), "O"))
        .await?;

    let hits = store.search_by_name(&format!("{marker} 50%"), 10).await?;
    assert_eq!(hits.len(), 1);
    assert!(hits[0].name.ends_with("50% Off"));

    let hits = store
        .search_by_name(&marker.to_uppercase(), 10)
        .await?;
    assert_eq!(hits.len(), 2);
    Ok(())
}

#[tokio::test]
async fn name_order_ignores_case() -> anyhow::Result<()> {
    let Some(store) = test_store().await? else {
        return Ok(());
    };

    let marker = uuid::Uuid::new_v4().simple().to_string();
    for name in [format!("Zeta {marker}"), format!("acme {marker}"), format!("Bo {marker}")] {
        store
            .insert(NewBusiness::new(name, unique_reg("pg-order"), "O"))
            .await?;
    }

    let names: Vec<String> = store
        .search_by_name(&marker, 10)
        .await?
        .into_iter()
        .map(|b| b.name)
        .collect();
    let expected = vec![
        format!("acme {marker}"),
        format!("Bo {marker}"),
        format!("Zeta {marker}"),
    ];
    assert_eq!(names, expected);
    assert_eq!(store.suggest_names(&marker, &marker, 10).await?, expected);
    Ok(())
}
