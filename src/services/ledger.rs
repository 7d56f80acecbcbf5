// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Balance-mutating operations: admin funding, dev faucet, car purchase.
//!
//! Every operation follows the same shape: validate, lock the affected
//! record set(s), load, check preconditions, compute the new snapshot,
//! persist, append an audit entry, then broadcast a feed event. Nothing is
//! broadcast until every snapshot the operation touches is durably
//! written.
//!
//! Lock order is fixed: users before cars. The purchase path is the only
//! one holding both.

use crate::db::{sets, JsonStore};
use crate::error::{AppError, Result};
use crate::models::event::FundSource;
use crate::models::{AuditEntry, Car, FeedEvent, PublicUser, User};
use crate::services::feed::EventFeed;
use std::sync::Arc;

/// Largest admin funding amount, in either direction.
pub const MAX_ADMIN_FUND: f64 = 1_000_000.0;
/// Largest single faucet credit.
pub const MAX_FAUCET_AMOUNT: f64 = 10_000.0;

/// Result of a successful purchase.
#[derive(Debug)]
pub struct PurchaseOutcome {
    pub car: Car,
    pub buyer: PublicUser,
    pub seller: PublicUser,
}

/// Ledger operations over the shared record store.
#[derive(Clone)]
pub struct LedgerService {
    store: JsonStore,
    feed: Arc<EventFeed>,
}

impl LedgerService {
    pub fn new(store: JsonStore, feed: Arc<EventFeed>) -> Self {
        Self { store, feed }
    }

    /// Admin credits (or debits, with a negative amount) a user's balance.
    ///
    /// The caller is responsible for the role check; this method assumes
    /// `admin_id` belongs to an admin.
    pub async fn admin_fund(
        &self,
        admin_id: &str,
        target_id: &str,
        amount: f64,
    ) -> Result<PublicUser> {
        if !amount.is_finite() || amount == 0.0 {
            return Err(AppError::BadRequest(
                "amount must be a finite, non-zero number".to_string(),
            ));
        }
        if amount.abs() > MAX_ADMIN_FUND {
            return Err(AppError::BadRequest(format!(
                "amount exceeds limit of {MAX_ADMIN_FUND}"
            )));
        }

        let _users = self.store.lock_set(sets::USERS).await;
        let mut users: Vec<User> = self.store.load(sets::USERS).await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == target_id)
            .ok_or_else(|| AppError::NotFound(format!("User {target_id} not found")))?;

        user.balance += amount;
        let funded = PublicUser::from(&*user);
        self.store.save(sets::USERS, &users).await?;

        let ts = now_millis();
        self.append_audit(AuditEntry::AdminFund {
            ts,
            admin_id: admin_id.to_string(),
            user_id: target_id.to_string(),
            amount,
        })
        .await;

        tracing::info!(admin = admin_id, user = target_id, amount, "Admin funding applied");
        self.feed.broadcast(&FeedEvent::Fund {
            by: FundSource::Admin,
            user_id: target_id.to_string(),
            amount,
            admin_id: Some(admin_id.to_string()),
            ts,
        });

        Ok(funded)
    }

    /// Dev faucet: the authenticated caller credits their own balance.
    pub async fn faucet(&self, user_id: &str, amount: f64) -> Result<PublicUser> {
        if !amount.is_finite() || amount <= 0.0 || amount > MAX_FAUCET_AMOUNT {
            return Err(AppError::BadRequest(format!(
                "amount must be in (0, {MAX_FAUCET_AMOUNT}]"
            )));
        }

        let _users = self.store.lock_set(sets::USERS).await;
        let mut users: Vec<User> = self.store.load(sets::USERS).await?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        user.balance += amount;
        let funded = PublicUser::from(&*user);
        self.store.save(sets::USERS, &users).await?;

        let ts = now_millis();
        self.append_audit(AuditEntry::DevFaucet {
            ts,
            user_id: user_id.to_string(),
            amount,
        })
        .await;

        tracing::info!(user = user_id, amount, "Faucet credit applied");
        self.feed.broadcast(&FeedEvent::Fund {
            by: FundSource::Faucet,
            user_id: user_id.to_string(),
            amount,
            admin_id: None,
            ts,
        });

        Ok(funded)
    }

    /// Atomic balance transfer plus ownership reassignment.
    ///
    /// Buyer debit, seller credit, and the owner change all commit before
    /// the purchase is reported or broadcast. The users snapshot is saved
    /// first, then the cars snapshot; a crash between the two leaves the
    /// transfer applied but the car unassigned, a gap inherited from the
    /// two-file layout.
    pub async fn purchase(&self, buyer_id: &str, car_id: &str) -> Result<PurchaseOutcome> {
        let _users = self.store.lock_set(sets::USERS).await;
        let _cars = self.store.lock_set(sets::CARS).await;

        let mut cars: Vec<Car> = self.store.load(sets::CARS).await?;
        let car = cars
            .iter_mut()
            .find(|c| c.id == car_id)
            .ok_or_else(|| AppError::NotFound(format!("Car {car_id} not found")))?;

        if car.owner_id == buyer_id {
            return Err(AppError::BadRequest(
                "you already own this car".to_string(),
            ));
        }
        if !car.price.is_finite() || car.price < 0.0 {
            return Err(AppError::BadRequest("car has an invalid price".to_string()));
        }

        let mut users: Vec<User> = self.store.load(sets::USERS).await?;

        let buyer_idx = users
            .iter()
            .position(|u| u.id == buyer_id)
            .ok_or_else(|| AppError::NotFound(format!("User {buyer_id} not found")))?;
        // Orphaned-owner guard: a car whose seller vanished cannot be sold,
        // otherwise the price would be credited to nobody.
        let seller_idx = users
            .iter()
            .position(|u| u.id == car.owner_id)
            .ok_or_else(|| AppError::Conflict("seller no longer exists".to_string()))?;

        if users[buyer_idx].balance < car.price {
            return Err(AppError::BadRequest("insufficient funds".to_string()));
        }

        let seller_id = car.owner_id.clone();
        users[buyer_idx].balance -= car.price;
        users[seller_idx].balance += car.price;
        car.owner_id = buyer_id.to_string();

        let outcome = PurchaseOutcome {
            car: car.clone(),
            buyer: PublicUser::from(&users[buyer_idx]),
            seller: PublicUser::from(&users[seller_idx]),
        };

        self.store.save(sets::USERS, &users).await?;
        self.store.save(sets::CARS, &cars).await?;

        let ts = now_millis();
        self.append_audit(AuditEntry::Purchase {
            ts,
            car_id: outcome.car.id.clone(),
            buyer_id: buyer_id.to_string(),
            seller_id: seller_id.clone(),
            price: outcome.car.price,
        })
        .await;

        tracing::info!(
            car = %outcome.car.id,
            buyer = buyer_id,
            seller = %seller_id,
            price = outcome.car.price,
            "Purchase committed"
        );
        self.feed.broadcast(&FeedEvent::Purchase {
            car_id: outcome.car.id.clone(),
            model: outcome.car.model.clone(),
            price: outcome.car.price,
            seller_id,
            buyer_id: buyer_id.to_string(),
            ts,
        });

        Ok(outcome)
    }

    /// Append an entry to the audit log. Audit failures are logged, not
    /// surfaced: the ledger mutation has already committed.
    async fn append_audit(&self, entry: AuditEntry) {
        let _audit = self.store.lock_set(sets::AUDIT).await;
        let result = async {
            let mut entries: Vec<AuditEntry> = self.store.load(sets::AUDIT).await?;
            entries.push(entry);
            self.store.save(sets::AUDIT, &entries).await
        }
        .await;

        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to append audit entry");
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
