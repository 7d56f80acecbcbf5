// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live event stream (Server-Sent Events).

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Extension, Router,
};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;

use crate::middleware::auth::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(stream_events))
}

/// Long-lived stream of named `purchase`, `fund`, and `ping` events.
///
/// Each connection registers a channel with the feed; when the client
/// goes away the receiver drops and the next broadcast prunes the
/// registration.
async fn stream_events(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    tracing::debug!(user = %auth.id, "Live channel connected");
    let rx = state.feed.subscribe();

    let stream = ReceiverStream::new(rx)
        .map(|message| Ok(Event::default().event(message.name).data(message.data.as_str())));

    Sse::new(stream)
}
