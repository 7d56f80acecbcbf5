// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Carlot: a small car-marketplace API
//!
//! This crate provides the backend API for a toy marketplace: accounts
//! with balances, car listings, atomic purchases, and a live event feed.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::JsonStore;
use services::{EventFeed, LedgerService, TokenService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: JsonStore,
    pub tokens: TokenService,
    pub feed: Arc<EventFeed>,
    pub ledger: LedgerService,
}

impl AppState {
    /// Wire up the state from a config and an opened store.
    pub fn new(config: Config, db: JsonStore) -> Self {
        let tokens = TokenService::new(&config.jwt_signing_key);
        let feed = Arc::new(EventFeed::new());
        let ledger = LedgerService::new(db.clone(), feed.clone());
        Self {
            config,
            db,
            tokens,
            feed,
            ledger,
        }
    }
}
