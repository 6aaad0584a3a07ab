//! PostgreSQL connectivity.
//!
//! Connections are short-lived: one per store call, dropped when the caller is done.

use crate::config::DatabaseConfig;
use tokio_postgres::{Client, NoTls};
use tracing::warn;

/// Open a single connection to the configured database
pub async fn connect_to_db(config: &DatabaseConfig) -> Result<Client, tokio_postgres::Error> {
    let mut pg = tokio_postgres::Config::new();
    pg.host(&config.host)
        .port(config.port)
        .dbname(&config.dbname)
        .user(&config.user)
        .password(&config.password);

    let (client, connection) = pg.connect(NoTls).await?;

    // The connection task ends once the client is dropped
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            warn!("database connection error: {}", e);
        }
    });

    Ok(client)
}
