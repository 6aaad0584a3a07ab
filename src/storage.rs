//! PostgreSQL storage for summaries.
//!
//! Every store opens its own connection, inserts one row and drops the
//! connection. There is no upsert: storing the same PR twice yields two rows.
//! The `model_responses` table is created outside this service.

use crate::config::DatabaseConfig;
use crate::db::connect_to_db;
use crate::summary::SummaryRecord;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

// The cast lets an INTEGER column accept the i64 parameter.
const INSERT_SUMMARY: &str =
    "INSERT INTO model_responses (pr_number, summary) VALUES ($1::BIGINT, $2)";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database connection failed: {0}")]
    Connect(#[source] tokio_postgres::Error),
    #[error("insert into model_responses failed: {0}")]
    Insert(#[source] tokio_postgres::Error),
}

/// What happened to a store request.
///
/// Failures never propagate to the HTTP caller; they are reported here instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    Stored,
    Failed { reason: String },
}

impl StoreOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, StoreOutcome::Stored)
    }
}

/// Persists summaries somewhere.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    async fn store_result(&self, record: &SummaryRecord) -> StoreOutcome;
}

pub struct PostgresStore {
    config: DatabaseConfig,
}

impl PostgresStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    /// Insert one row, surfacing any failure
    pub async fn insert(&self, record: &SummaryRecord) -> Result<(), StorageError> {
        let client = connect_to_db(&self.config)
            .await
            .map_err(StorageError::Connect)?;

        client
            .execute(INSERT_SUMMARY, &[&record.pr_number, &record.summary])
            .await
            .map_err(StorageError::Insert)?;

        Ok(())
    }
}

#[async_trait]
impl SummaryStore for PostgresStore {
    async fn store_result(&self, record: &SummaryRecord) -> StoreOutcome {
        match self.insert(record).await {
            Ok(()) => {
                info!("Stored summary for PR #{}", record.pr_number);
                StoreOutcome::Stored
            }
            Err(e) => {
                warn!(
                    pr_number = record.pr_number,
                    "Skipping summary persistence: {}", e
                );
                StoreOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
