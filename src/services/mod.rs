// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod feed;
pub mod ledger;
pub mod password;
pub mod tokens;

pub use feed::EventFeed;
pub use ledger::LedgerService;
pub use tokens::TokenService;
