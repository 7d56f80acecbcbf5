// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Carlot API Server
//!
//! A small marketplace: users register, hold a balance, list cars, and
//! buy/sell with atomic balance transfer; admins fund accounts and a live
//! SSE feed publishes purchases and funding.

use carlot::{
    config::Config,
    db::{sets, JsonStore},
    models::{Role, User},
    services::{feed::spawn_keepalive, password::hash_password},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, env = %config.environment, "Starting Carlot API");

    // Open the record store
    let db = JsonStore::open(&config.data_dir).expect("Failed to open record store");
    tracing::info!(path = %config.data_dir.display(), "Record store opened");

    // Seed a bootstrap admin into an empty store, if configured
    if let Some(password) = &config.admin_password {
        bootstrap_admin(&db, password).await?;
    }

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), db));

    // Keep-alive pings for the live event feed
    spawn_keepalive(state.feed.clone());

    // Build router
    let app = carlot::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create an `admin` account when the users set is empty, so funding is
/// reachable without hand-editing JSON files.
async fn bootstrap_admin(db: &JsonStore, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = db.load(sets::USERS).await?;
    if !users.is_empty() {
        return Ok(());
    }

    let admin = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: "admin".to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
        balance: 0.0,
        refresh_version: 1,
    };
    users.push(admin);
    db.save(sets::USERS, &users).await?;
    tracing::info!("Bootstrap admin created");
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carlot=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
