//! Helpers shared by the unit tests.

use crate::config::DatabaseConfig;
use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{}", addr)
}

/// A local port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Database settings that can never connect
pub fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: closed_port(),
        dbname: "summaries".to_string(),
        user: "svc".to_string(),
        password: "secret".to_string(),
    }
}
