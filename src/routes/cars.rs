// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Car listing CRUD and the purchase endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::db::sets;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Car, PublicUser};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cars", get(list_cars).post(create_car))
        .route("/cars/{id}", put(update_car).delete(delete_car))
        .route("/cars/{id}/buy", post(buy_car))
}

async fn list_cars(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Car>>> {
    let cars: Vec<Car> = state.db.load(sets::CARS).await?;
    Ok(Json(cars))
}

/// Validate a price field: present, finite, non-negative.
fn price_field(body: &Value) -> Result<f64> {
    let price = body
        .get("price")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite())
        .ok_or_else(|| AppError::BadRequest("price must be a finite number".to_string()))?;
    if price < 0.0 {
        return Err(AppError::BadRequest("price must not be negative".to_string()));
    }
    Ok(price)
}

/// List a car for sale, owned by the caller.
async fn create_car(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Car>)> {
    let model = body
        .get("model")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("model must be a non-empty string".to_string()))?;
    let price = price_field(&body)?;

    let car = Car {
        id: uuid::Uuid::new_v4().to_string(),
        model: model.to_string(),
        price,
        owner_id: auth.id.clone(),
    };

    let _cars = state.db.lock_set(sets::CARS).await;
    let mut cars: Vec<Car> = state.db.load(sets::CARS).await?;
    cars.push(car.clone());
    state.db.save(sets::CARS, &cars).await?;

    tracing::info!(car = %car.id, owner = %auth.id, "Car listed");
    Ok((StatusCode::CREATED, Json(car)))
}

/// Update a car's plain fields. Owner or admin only; ownership transfers
/// go through the purchase endpoint.
async fn update_car(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Car>> {
    let _cars = state.db.lock_set(sets::CARS).await;
    let mut cars: Vec<Car> = state.db.load(sets::CARS).await?;
    let car = cars
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Car {id} not found")))?;

    if car.owner_id != auth.id && !auth.is_admin() {
        return Err(AppError::Forbidden);
    }

    if let Some(model) = body.get("model") {
        let model = model
            .as_str()
            .filter(|m| !m.is_empty())
            .ok_or_else(|| AppError::BadRequest("model must be a non-empty string".to_string()))?;
        car.model = model.to_string();
    }
    if body.get("price").is_some() {
        car.price = price_field(&body)?;
    }

    let updated = car.clone();
    state.db.save(sets::CARS, &cars).await?;
    Ok(Json(updated))
}

async fn delete_car(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let _cars = state.db.lock_set(sets::CARS).await;
    let mut cars: Vec<Car> = state.db.load(sets::CARS).await?;
    let car = cars
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Car {id} not found")))?;

    if car.owner_id != auth.id && !auth.is_admin() {
        return Err(AppError::Forbidden);
    }

    cars.retain(|c| c.id != id);
    state.db.save(sets::CARS, &cars).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Purchase response: the reassigned car plus both touched accounts.
#[derive(Serialize)]
pub struct PurchaseResponse {
    pub car: Car,
    pub buyer: PublicUser,
    pub seller: PublicUser,
}

/// Buy a car: atomic balance transfer and ownership reassignment.
async fn buy_car(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseResponse>> {
    let outcome = state.ledger.purchase(&auth.id, &id).await?;
    Ok(Json(PurchaseResponse {
        car: outcome.car,
        buyer: outcome.buyer,
        seller: outcome.seller,
    }))
}
