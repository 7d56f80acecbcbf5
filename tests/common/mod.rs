// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use carlot::config::Config;
use carlot::db::{sets, JsonStore};
use carlot::models::{Role, User};
use carlot::routes::create_router;
use carlot::services::password::hash_password;
use carlot::AppState;
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_PASSWORD: &str = "admin-pw";

/// Create a test app over a temp-dir store.
///
/// Returns the router, the shared state, and the tempdir guard (dropping
/// it deletes the store).
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>, TempDir) {
    create_test_app_with_config(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>, TempDir) {
    let dir = TempDir::new().expect("tempdir");
    let db = JsonStore::open(dir.path()).expect("open store");
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state, dir)
}

/// Insert an admin user directly into the store.
#[allow(dead_code)]
pub async fn seed_admin(state: &AppState) -> String {
    let _guard = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await.unwrap();
    let admin = User {
        id: "admin-id".to_string(),
        username: "admin".to_string(),
        password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
        role: Role::Admin,
        balance: 0.0,
        refresh_version: 1,
    };
    let id = admin.id.clone();
    users.push(admin);
    state.db.save(sets::USERS, &users).await.unwrap();
    id
}

/// All Set-Cookie header values on a response.
#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The full Set-Cookie line for a named cookie.
#[allow(dead_code)]
pub fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

/// Just the `name=value` pair, for replaying in a Cookie request header.
#[allow(dead_code)]
pub fn cookie_pair(headers: &[String], name: &str) -> String {
    find_cookie(headers, name)
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

/// Build a JSON POST request.
#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a JSON POST request carrying a Cookie header.
#[allow(dead_code)]
pub fn post_json_with_cookies(uri: &str, cookies: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookies)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a GET request carrying a Cookie header.
#[allow(dead_code)]
pub fn get_with_cookies(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookies)
        .body(Body::empty())
        .unwrap()
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
