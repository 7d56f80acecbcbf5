// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin user management (list, create, update, delete).
//!
//! Balance changes never go through these handlers; they belong to the
//! ledger operations. The one exception is an explicit seed balance on
//! admin-created accounts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde_json::Value;
use std::sync::Arc;

use crate::db::sets;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{PublicUser, Role, User};
use crate::services::password::hash_password;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", put(update_user).delete(delete_user))
}

fn require_admin(auth: &AuthUser) -> Result<()> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PublicUser>>> {
    require_admin(&auth)?;
    let users: Vec<User> = state.db.load(sets::USERS).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

fn parse_role(value: &Value) -> Result<Role> {
    serde_json::from_value(value.clone())
        .map_err(|_| AppError::BadRequest("role must be \"admin\" or \"user\"".to_string()))
}

/// Admin-create an account, optionally with a role and a seed balance.
async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    require_admin(&auth)?;

    let username = body
        .get("username")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("username must be a non-empty string".to_string()))?;
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("password must be a string".to_string()))?;
    let role = match body.get("role") {
        Some(value) => parse_role(value)?,
        None => Role::User,
    };
    let balance = match body.get("balance") {
        Some(value) => value
            .as_f64()
            .filter(|b| b.is_finite() && *b >= 0.0)
            .ok_or_else(|| {
                AppError::BadRequest("balance must be a non-negative number".to_string())
            })?,
        None => 0.0,
    };

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;
    if users.iter().any(|u| u.username == username) {
        return Err(AppError::Conflict("username already taken".to_string()));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role,
        balance,
        refresh_version: 1,
    };
    let public = PublicUser::from(&user);
    users.push(user);
    state.db.save(sets::USERS, &users).await?;

    tracing::info!(username, by = %auth.id, "User created by admin");
    Ok((StatusCode::CREATED, Json(public)))
}

/// Update a user's plain fields (username, role).
async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<PublicUser>> {
    require_admin(&auth)?;

    let new_username = body
        .get("username")
        .map(|value| {
            value
                .as_str()
                .filter(|u| !u.is_empty())
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::BadRequest("username must be a non-empty string".to_string())
                })
        })
        .transpose()?;
    let new_role = body.get("role").map(parse_role).transpose()?;

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;

    if let Some(username) = &new_username {
        if users.iter().any(|u| &u.username == username && u.id != id) {
            return Err(AppError::Conflict("username already taken".to_string()));
        }
    }

    let user = users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    if let Some(username) = new_username {
        user.username = username;
    }
    if let Some(role) = new_role {
        user.role = role;
    }

    let public = PublicUser::from(&*user);
    state.db.save(sets::USERS, &users).await?;
    Ok(Json(public))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    require_admin(&auth)?;

    let _users = state.db.lock_set(sets::USERS).await;
    let mut users: Vec<User> = state.db.load(sets::USERS).await?;
    if !users.iter().any(|u| u.id == id) {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }

    users.retain(|u| u.id != id);
    state.db.save(sets::USERS, &users).await?;

    tracing::info!(user = %id, by = %auth.id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
