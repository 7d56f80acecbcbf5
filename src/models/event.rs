// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live feed event payloads.
//!
//! Each variant maps to a named SSE event; the JSON body repeats the name
//! in an `event` field so consumers can also dispatch on the payload.

use serde::Serialize;

/// Funding source for a `fund` event.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FundSource {
    Admin,
    Faucet,
}

/// Domain event pushed to connected live channels.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum FeedEvent {
    #[serde(rename_all = "camelCase")]
    Purchase {
        car_id: String,
        model: String,
        price: f64,
        seller_id: String,
        buyer_id: String,
        ts: i64,
    },
    #[serde(rename_all = "camelCase")]
    Fund {
        by: FundSource,
        user_id: String,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        admin_id: Option<String>,
        ts: i64,
    },
    Ping { ts: i64 },
}

impl FeedEvent {
    /// SSE event name for this payload.
    pub fn name(&self) -> &'static str {
        match self {
            FeedEvent::Purchase { .. } => "purchase",
            FeedEvent::Fund { .. } => "fund",
            FeedEvent::Ping { .. } => "ping",
        }
    }
}
