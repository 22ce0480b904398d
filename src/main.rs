// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Sector Aggregator Contributors

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sector_aggregator_server::api::router;
use sector_aggregator_server::auth::{AuthRuntime, Role};
use sector_aggregator_server::config::AppConfig;
use sector_aggregator_server::sms::LogSmsGateway;
use sector_aggregator_server::state::AppState;
use sector_aggregator_server::storage::{Database, StoreError};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let db_path = config.data_dir.join("aggregator.redb");
    let db = Database::open(&db_path).expect("Failed to open database");
    tracing::info!(path = %db_path.display(), "database opened");

    // Bootstrap: an administrator account seeded from the environment, so a
    // fresh deployment has someone able to drive the approval queue.
    if let Some(ref phone) = config.seed_admin_phone {
        match db.create_user(phone, "Administrator", [Role::Administrator]) {
            Ok(admin) => tracing::info!(user_id = admin.id, "seeded administrator account"),
            Err(StoreError::AlreadyExists(_)) => {}
            Err(e) => panic!("Failed to seed administrator: {e}"),
        }
    }

    let auth = AuthRuntime::new(
        &config.jwt.secret,
        config.jwt.ttl,
        config.jwt.refresh_threshold,
    );
    let state = AppState::new(db, auth, Arc::new(LogSmsGateway), config.transition_policy);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");

    tracing::info!(%addr, "sector aggregator listening (docs at /docs)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}
