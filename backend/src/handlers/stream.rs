//! WebSocket stream of the record list
//!
//! A subscriber gets the full list on connect, after every change, and at
//! least once per configured interval while the list is idle.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;

use crate::services::RecordStore;
use crate::AppState;

pub async fn stream_records(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let period = Duration::from_secs(state.config.stream.interval_secs.max(1));
    let records = state.records.clone();
    ws.on_upgrade(move |socket| {
        let (sink, stream) = socket.split();
        push_records(sink, stream, records, period)
    })
}

/// Send list snapshots to `sink` until the client closes `stream` or a send fails
async fn push_records<S, R, E>(mut sink: S, mut stream: R, records: RecordStore, period: Duration)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
{
    let mut updates = records.subscribe();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!("WebSocket subscriber connected");

    loop {
        tokio::select! {
            // The first tick completes immediately, which sends the initial snapshot
            _ = ticker.tick() => {}
            update = updates.recv() => match update {
                Ok(_) | Err(RecvError::Lagged(_)) => ticker.reset(),
                Err(RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => continue,
            },
        }

        let snapshot = records.list().await;
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!("Failed to serialize record snapshot: {}", err);
                break;
            }
        };
        if sink.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }

    tracing::info!("WebSocket connection closed");
}
