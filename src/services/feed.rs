// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fan-out of domain events to connected live channels.
//!
//! The registry is an explicit object owned by the shared state, created
//! at server start. Broadcast serializes the event once and try-sends to
//! every registered channel; a channel whose peer is gone (or whose buffer
//! is saturated) is dropped from the registry without affecting the other
//! channels or the operation that triggered the broadcast.

use crate::models::FeedEvent;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Keep-alive ping interval.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Per-channel buffer; a subscriber this far behind is disconnected.
const CHANNEL_CAPACITY: usize = 32;

/// One serialized event as delivered to a channel.
#[derive(Debug, Clone)]
pub struct FeedMessage {
    /// SSE event name (`purchase`, `fund`, `ping`)
    pub name: &'static str,
    /// JSON payload, serialized once and shared across channels
    pub data: Arc<String>,
}

/// Registry of currently connected live channels.
pub struct EventFeed {
    channels: DashMap<u64, mpsc::Sender<FeedMessage>>,
    next_id: AtomicU64,
}

impl EventFeed {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a new live channel; the returned receiver yields every
    /// event broadcast from now on. Dropping the receiver disconnects the
    /// channel: the next broadcast prunes its registration.
    pub fn subscribe(&self) -> mpsc::Receiver<FeedMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.channels.insert(id, tx);
        tracing::debug!(channel = id, "Live channel subscribed");
        rx
    }

    /// Number of currently registered channels.
    pub fn subscriber_count(&self) -> usize {
        self.channels.len()
    }

    /// Broadcast an event to all registered channels, best-effort per
    /// channel.
    pub fn broadcast(&self, event: &FeedEvent) {
        let data = match serde_json::to_string(event) {
            Ok(json) => Arc::new(json),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize feed event");
                return;
            }
        };
        let message = FeedMessage {
            name: event.name(),
            data,
        };

        self.channels.retain(|id, tx| {
            if tx.try_send(message.clone()).is_err() {
                tracing::debug!(channel = *id, "Dropping dead live channel");
                false
            } else {
                true
            }
        });
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the keep-alive task: a `ping` event every [`PING_INTERVAL`] so
/// idle connections are not reclaimed by intermediaries.
pub fn spawn_keepalive(feed: Arc<EventFeed>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PING_INTERVAL);
        interval.tick().await; // first tick fires immediately; skip it
        loop {
            interval.tick().await;
            feed.broadcast(&FeedEvent::Ping {
                ts: chrono::Utc::now().timestamp_millis(),
            });
        }
    })
}
