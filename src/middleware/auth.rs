// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access-token authentication middleware.

use crate::db::sets;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

/// Access-token cookie name.
pub const COOKIE_ACCESS: &str = "auth";

/// Authenticated caller, resolved against the users set.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Middleware that requires a valid access token resolving to an existing
/// user. A valid token whose user is gone is treated as unauthenticated,
/// not as an error.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then bearer header
    let token = if let Some(cookie) = jar.get(COOKIE_ACCESS) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    let claims = state
        .tokens
        .verify_access(&token)
        .ok_or(AppError::Unauthorized)?;

    let users: Vec<User> = state.db.load(sets::USERS).await?;
    let user = users
        .iter()
        .find(|u| u.id == claims.sub)
        .ok_or(AppError::Unauthorized)?;

    let auth_user = AuthUser {
        id: user.id.clone(),
        username: user.username.clone(),
        role: user.role,
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
