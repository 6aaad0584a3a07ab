//! Integration tests for PostgresStore against a live database.
//!
//! Skipped unless TEST_POSTGRES_HOST is set. Connection details come from
//! TEST_POSTGRES_HOST, TEST_POSTGRES_PORT, TEST_POSTGRES_DB, TEST_POSTGRES_USER
//! and TEST_POSTGRES_PASSWORD.

//! Run with: TEST_POSTGRES_HOST=localhost cargo test --test postgres_store

use std::time::{SystemTime, UNIX_EPOCH};

use prsumma::config::DatabaseConfig;
use prsumma::db::connect_to_db;
use prsumma::storage::{PostgresStore, StoreOutcome, SummaryStore};
use prsumma::SummaryRecord;

fn test_config() -> Option<DatabaseConfig> {
    let var = |key: &str, default: &str| std::env::var(key).unwrap_or_else(|_| default.to_string());
    let host = std::env::var("TEST_POSTGRES_HOST").ok()?;
    Some(DatabaseConfig {
        host,
        port: var("TEST_POSTGRES_PORT", "5432").parse().ok()?,
        dbname: var("TEST_POSTGRES_DB", "postgres"),
        user: var("TEST_POSTGRES_USER", "postgres"),
        password: var("TEST_POSTGRES_PASSWORD", "postgres"),
    })
}

/// A pr_number unlikely to collide with earlier runs
fn unique_pr_number() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .subsec_nanos();
    1_000_000 + i64::from(nanos % 1_000_000_000)
}

async fn rows_for(config: &DatabaseConfig, pr_number: i64) -> Vec<String> {
    let client = connect_to_db(config).await.expect("connect");
    client
        .query(
            "SELECT summary FROM model_responses WHERE pr_number = $1::BIGINT",
            &[&pr_number],
        )
        .await
        .expect("select")
        .iter()
        .map(|row| row.get::<_, String>(0))
        .collect()
}

async fn ensure_table(config: &DatabaseConfig) {
    let client = connect_to_db(config).await.expect("connect");
    client
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS model_responses (pr_number INTEGER, summary TEXT)",
        )
        .await
        .expect("create table");
}

#[tokio::test]
async fn test_store_inserts_exactly_one_row() {
    let Some(config) = test_config() else {
        eprintln!("TEST_POSTGRES_HOST not set, skipping");
        return;
    };
    ensure_table(&config).await;

    let pr_number = unique_pr_number();
    let store = PostgresStore::new(config.clone());
    let outcome = store
        .store_result(&SummaryRecord::new(pr_number, "Adds a null check".to_string()))
        .await;

    assert_eq!(outcome, StoreOutcome::Stored);
    assert_eq!(rows_for(&config, pr_number).await, vec!["Adds a null check"]);
}

#[tokio::test]
async fn test_duplicate_stores_produce_duplicate_rows() {
    let Some(config) = test_config() else {
        eprintln!("TEST_POSTGRES_HOST not set, skipping");
        return;
    };
    ensure_table(&config).await;

    let pr_number = unique_pr_number() + 1_000_000_000;
    let store = PostgresStore::new(config.clone());
    let record = SummaryRecord::new(pr_number, "Same summary".to_string());
    assert!(store.store_result(&record).await.is_stored());
    assert!(store.store_result(&record).await.is_stored());

    assert_eq!(rows_for(&config, pr_number).await.len(), 2);
}

#[tokio::test]
async fn test_wrong_credentials_are_reported_not_raised() {
    let Some(mut config) = test_config() else {
        eprintln!("TEST_POSTGRES_HOST not set, skipping");
        return;
    };
    config.password = "definitely-not-the-password".to_string();
    config.user = "prsumma_no_such_user".to_string();

    let outcome = PostgresStore::new(config)
        .store_result(&SummaryRecord::new(1, "unused".to_string()))
        .await;
    assert!(matches!(outcome, StoreOutcome::Failed { .. }));
}
