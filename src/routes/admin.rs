// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Funding endpoints: admin fund and the dev-only faucet.

use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Extension, Json, Router,
};
use serde_json::Value;
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::PublicUser;
use crate::AppState;

/// Header carrying the faucet shared secret.
pub const FAUCET_SECRET_HEADER: &str = "x-faucet-secret";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/admin/fund", post(admin_fund))
}

/// Mounted only outside production.
pub fn faucet_routes() -> Router<Arc<AppState>> {
    Router::new().route("/faucet", post(faucet))
}

/// Amounts must be finite numbers; anything else is rejected before any
/// store read.
fn amount_field(body: &Value) -> Result<f64> {
    body.get("amount")
        .and_then(Value::as_f64)
        .filter(|a| a.is_finite())
        .ok_or_else(|| AppError::BadRequest("amount must be a finite number".to_string()))
}

/// Admin credits or debits an arbitrary account.
async fn admin_fund(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<Json<PublicUser>> {
    if !auth.is_admin() {
        return Err(AppError::Forbidden);
    }

    let amount = amount_field(&body)?;
    let target = body
        .get("userId")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::BadRequest("userId must be a string".to_string()))?;

    let funded = state.ledger.admin_fund(&auth.id, target, amount).await?;
    Ok(Json(funded))
}

/// Self-service faucet for development environments. Gated by a shared
/// secret header on top of normal authentication.
async fn faucet(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<PublicUser>> {
    let presented = headers
        .get(FAUCET_SECRET_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    let expected = state.config.faucet_secret.as_bytes();
    if expected.is_empty() || presented.as_bytes().ct_eq(expected).unwrap_u8() != 1 {
        return Err(AppError::Forbidden);
    }

    let amount = amount_field(&body)?;
    let funded = state.ledger.faucet(&auth.id, amount).await?;
    Ok(Json(funded))
}
