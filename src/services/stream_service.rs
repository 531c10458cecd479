use std::{
    convert::Infallible,
    future::Future,
    time::{Duration, SystemTime},
};

use axum::response::sse::{Event, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;

use crate::{
    dto::{format_system_time, sse::ServerEvent, validation::normalize_room_code},
    error::ServiceError,
    identity::Identity,
    state::{
        AppState, SharedState,
        registry::RoomRegistry,
        room::GameRoom,
    },
};

/// Cadence of the comment heartbeats that keep intermediaries from closing
/// idle streams.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Attach a new event stream to a room: the caller must already be a player.
/// The new sink gets an immediate snapshot; everyone else sees the presence
/// change. `select` picks the game's registry out of the shared state so the
/// teardown task can find the room again after the client disconnects.
pub async fn subscribe<R>(
    state: SharedState,
    select: fn(&AppState) -> &RoomRegistry<R>,
    identity: Identity,
    code: &str,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>> + use<R>>, ServiceError>
where
    R: GameRoom,
{
    let code = normalize_room_code(code);
    let room_arc = select(&state).resolve(&code)?;

    let (receiver, initial) = {
        let mut room = room_arc.lock().await;
        room.core().ensure_member(&identity.user_id)?;
        room.core_mut().connect(&identity.user_id);

        let receiver = room.core().hub.subscribe();
        let initial = room.state_event().ok();
        // Everyone else sees the presence change right away.
        room.publish_state();
        (receiver, initial)
    };

    info!(room = %code, user = %identity.user_id, "stream connected");

    Ok(stream_response(receiver, initial, move || async move {
        if let Some(room_arc) = select(&state).get(&code) {
            let mut room = room_arc.lock().await;
            if room.core_mut().disconnect(&identity.user_id) {
                room.publish_state();
            }
        }
        info!(room = %code, user = %identity.user_id, "stream disconnected");
    }))
}

/// Convert a broadcast receiver into an SSE response. A forwarder task pushes
/// events and heartbeats into a small bounded channel; when the client goes
/// away the channel closes and `teardown` runs with the room still
/// reachable through the registry.
fn stream_response<F, Fut>(
    mut receiver: broadcast::Receiver<ServerEvent>,
    initial: Option<ServerEvent>,
    teardown: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        let mut alive = match initial {
            Some(event) => tx.send(Ok(to_sse_event(event))).await.is_ok(),
            None => true,
        };

        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        // The first tick completes immediately; skip it so heartbeats start
        // one interval in.
        heartbeat.tick().await;

        while alive {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    alive = forward_broadcast(recv_result, &tx).await;
                }
                _ = heartbeat.tick() => {
                    alive = forward_heartbeat(&tx).await;
                }
            }
        }

        teardown().await;
    });

    // response stream reads from mpsc; when the client disconnects axum drops
    // this stream and the forwarder observes the closed channel
    let stream = ReceiverStream::new(rx);
    Sse::new(stream)
}

fn to_sse_event(payload: ServerEvent) -> Event {
    Event::default().event(payload.event).data(payload.data)
}

/// Forward a broadcast payload, handling lag and closed rooms gracefully.
/// Lagged receivers stay subscribed: the next full snapshot corrects them.
async fn forward_broadcast(
    recv_result: Result<ServerEvent, RecvError>,
    tx: &mpsc::Sender<Result<Event, Infallible>>,
) -> bool {
    match recv_result {
        Ok(payload) => tx.send(Ok(to_sse_event(payload))).await.is_ok(),
        Err(RecvError::Closed) => false,
        Err(RecvError::Lagged(_)) => true,
    }
}

/// Push the timestamped comment heartbeat: `: heartbeat <iso>`.
async fn forward_heartbeat(tx: &mpsc::Sender<Result<Event, Infallible>>) -> bool {
    let comment = format!("heartbeat {}", format_system_time(SystemTime::now()));
    tx.send(Ok(Event::default().comment(comment))).await.is_ok()
}
