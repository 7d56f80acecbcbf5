// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session protocol: register, login, refresh, logout.
//!
//! Sessions are stateless apart from the per-user `refreshVersion`
//! counter, which anchors revocation: every login, refresh, and logout
//! bumps it, and a refresh token is honored only while its embedded `rv`
//! equals the stored counter exactly. Rotation-on-use makes every refresh
//! token single-use; reuse after rotation is indistinguishable from a
//! revoked session.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::db::sets;
use crate::error::{AppError, Result};
use crate::middleware::auth::{AuthUser, COOKIE_ACCESS};
use crate::models::{PublicUser, Role, User};
use crate::services::password::{hash_password, verify_password};
use crate::services::tokens::{ACCESS_TTL_SECS, REFRESH_TTL_SECS};
use crate::AppState;

/// Refresh-token cookie name.
pub const COOKIE_REFRESH: &str = "refresh";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
}

/// Routes that sit behind the access-token middleware.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

#[derive(Serialize)]
struct OkResponse {
    success: bool,
}

fn build_cookie(name: &'static str, value: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
    let mut cookie = Cookie::build((name, value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs as i64))
        .build();
    if secure {
        cookie.set_secure(true);
    }
    cookie
}

/// Issue a fresh access+refresh pair bound to `refresh_version` and set
/// both as cookies.
fn set_auth_cookies(
    state: &AppState,
    jar: CookieJar,
    user_id: &str,
    refresh_version: u64,
) -> Result<CookieJar> {
    let access = state.tokens.sign_access(user_id)?;
    let refresh = state.tokens.sign_refresh(user_id, refresh_version)?;
    let secure = state.config.is_production();

    Ok(jar
        .add(build_cookie(COOKIE_ACCESS, access, ACCESS_TTL_SECS, secure))
        .add(build_cookie(COOKIE_REFRESH, refresh, REFRESH_TTL_SECS, secure)))
}

/// Expire both auth cookies.
fn clear_auth_cookies(state: &AppState, jar: CookieJar) -> CookieJar {
    let secure = state.config.is_production();
    jar.add(build_cookie(COOKIE_ACCESS, String::new(), 0, secure))
        .add(build_cookie(COOKIE_REFRESH, String::new(), 0, secure))
}

/// Pull a required string field out of a JSON body.
fn string_field<'a>(body: &'a Value, field: &str) -> Result<&'a str> {
    body.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest(format!("{field} must be a string")))
}

/// Create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<(StatusCode, CookieJar, Json<PublicUser>)> {
    let username = string_field(&body, "username")?;
    if username.is_empty() {
        return Err(AppError::BadRequest("username must not be empty".to_string()));
    }
    let password = string_field(&body, "password")?;

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;

    // Case-sensitive exact match, same as login.
    if users.iter().any(|u| u.username == username) {
        return Err(AppError::Conflict("username already taken".to_string()));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role: Role::User,
        balance: 0.0,
        refresh_version: 1,
    };
    let public = PublicUser::from(&user);
    users.push(user);
    state.db.save(sets::USERS, &users).await?;

    tracing::info!(username, "User registered");
    let jar = set_auth_cookies(&state, jar, &public.id, 1)?;
    Ok((StatusCode::CREATED, jar, Json(public)))
}

/// Log in with username/password; rotates the refresh lineage.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<(CookieJar, Json<PublicUser>)> {
    let username = string_field(&body, "username")?;
    let password = string_field(&body, "password")?;

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;

    let user = users
        .iter_mut()
        .find(|u| u.username == username)
        .filter(|u| verify_password(password, &u.password_hash))
        .ok_or(AppError::Unauthorized)?;

    // Invalidates every previously issued refresh token for this user.
    user.refresh_version += 1;
    let refresh_version = user.refresh_version;
    let public = PublicUser::from(&*user);
    state.db.save(sets::USERS, &users).await?;

    tracing::info!(username, "User logged in");
    let jar = set_auth_cookies(&state, jar, &public.id, refresh_version)?;
    Ok((jar, Json(public)))
}

/// Rotate a refresh token for a new access+refresh pair.
///
/// The presented token's `rv` must equal the stored counter exactly; a
/// stale token (already rotated, or revoked by logout) fails with the
/// same 401 as a forged one.
async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<OkResponse>)> {
    let token = jar.get(COOKIE_REFRESH).ok_or(AppError::Unauthorized)?;
    let claims = state
        .tokens
        .verify_refresh(token.value())
        .ok_or(AppError::Unauthorized)?;

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;
    let user = users
        .iter_mut()
        .find(|u| u.id == claims.sub)
        .ok_or(AppError::Unauthorized)?;

    if claims.rv != user.refresh_version {
        return Err(AppError::Unauthorized);
    }

    // Rotation-on-use: the token just presented is now dead too.
    user.refresh_version += 1;
    let refresh_version = user.refresh_version;
    let user_id = user.id.clone();
    state.db.save(sets::USERS, &users).await?;

    let jar = set_auth_cookies(&state, jar, &user_id, refresh_version)?;
    Ok((jar, Json(OkResponse { success: true })))
}

/// End the session. Bumps the refresh counter when the presented refresh
/// token still resolves, clears cookies either way, and always reports
/// success.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<OkResponse>)> {
    if let Some(claims) = jar
        .get(COOKIE_REFRESH)
        .and_then(|c| state.tokens.verify_refresh(c.value()))
    {
        let _users = state.db.lock_set(sets::USERS).await;
        let mut users: Vec<User> = state.db.load(sets::USERS).await?;
        if let Some(user) = users.iter_mut().find(|u| u.id == claims.sub) {
            user.refresh_version += 1;
            state.db.save(sets::USERS, &users).await?;
            tracing::info!(user = %claims.sub, "Session revoked on logout");
        }
    }

    let jar = clear_auth_cookies(&state, jar);
    Ok((jar, Json(OkResponse { success: true })))
}

/// Current user profile.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PublicUser>> {
    let users: Vec<User> = state.db.load(sets::USERS).await?;
    let user = users
        .iter()
        .find(|u| u.id == auth.id)
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(PublicUser::from(user)))
}
