use std::sync::Arc;

use tokio::{sync::Mutex, time::sleep};
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        memory::{
            CreateMemoryRequest, JoinMemoryResponse, MemorySnapshot, PickCardRequest,
            PickCardResponse, StartMemoryRequest,
        },
    },
    error::ServiceError,
    identity::Identity,
    state::{
        SharedState,
        memory::{
            CARD_COUNT_CHOICES, DEFAULT_CARD_COUNT, MISMATCH_RESOLVE_DELAY, MemoryRoom,
            PickOutcome,
        },
        room::{GameRoom, RoomStatus},
    },
};

pub const MAX_PLAYERS: usize = 8;

fn validate_card_count(value: Option<i64>) -> Result<Option<usize>, ServiceError> {
    match value {
        None => Ok(None),
        Some(raw) => usize::try_from(raw)
            .ok()
            .filter(|count| CARD_COUNT_CHOICES.contains(count))
            .map(Some)
            .ok_or(ServiceError::InvalidCardCount),
    }
}

/// Open a room with the caller as host.
pub async fn create_room(
    state: &SharedState,
    identity: &Identity,
    request: CreateMemoryRequest,
) -> Result<CreatedResponse, ServiceError> {
    let card_count = validate_card_count(request.card_count)?.unwrap_or(DEFAULT_CARD_COUNT);

    let (code, _room) = state
        .memory()
        .create(|code| MemoryRoom::new(code, identity, card_count))?;

    info!(room = %code, user = %identity.user_id, card_count, "memory room created");
    Ok(CreatedResponse::new(code))
}

/// Seat the caller, or succeed idempotently when they are already in.
pub async fn join(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<JoinMemoryResponse, ServiceError> {
    let room_arc = state.memory().resolve(code)?;
    let mut room = room_arc.lock().await;

    if !room.core.is_member(&identity.user_id) {
        if room.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }
        if room.core.players.len() >= MAX_PLAYERS {
            return Err(ServiceError::RoomFull);
        }
        room.seat_player(identity);
        room.publish_state();
    }

    Ok(JoinMemoryResponse {
        ok: true,
        room: MemorySnapshot::from(&*room),
    })
}

/// Remove the caller, collecting the room once it empties. When the leaver
/// held the turn during a mismatch, the armed flip-back is cancelled and run
/// inline: `turns.remove` already handed the turn to the follower, so the
/// deferred task's own advance would skip them.
pub async fn leave(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<Ack, ServiceError> {
    let room_arc = state.memory().resolve(code)?;
    let mut room = room_arc.lock().await;

    if !room.core.is_member(&identity.user_id) {
        return Ok(Ack::ok());
    }

    let was_host = room.core.host_user_id.as_deref() == Some(identity.user_id.as_str());
    let held_turn = room.core.turn_user_id() == Some(identity.user_id.as_str());
    room.core.remove_player(&identity.user_id);
    room.core.turns.remove(&identity.user_id);
    if was_host {
        room.core.transfer_host_from(&identity.user_id);
    }

    if room.resolving && held_turn {
        room.core.timer.cancel();
        room.revealed_indices.clear();
        room.resolving = false;
    }

    if room.core.status == RoomStatus::Playing && room.core.turns.is_empty() {
        room.core.finish();
    }

    if room.core.players.is_empty() {
        room.core.timer.cancel();
        state.memory().remove(&room.core.code);
        info!(room = %room.core.code, "memory room collected");
    } else {
        room.publish_state();
    }

    Ok(Ack::ok())
}

/// Host-only start: deals a fresh deck from the country catalogue.
pub async fn start(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: StartMemoryRequest,
) -> Result<Ack, ServiceError> {
    let room_arc = state.memory().resolve(code)?;
    let mut room = room_arc.lock().await;

    let override_count = validate_card_count(request.card_count)?;
    room.start(
        &identity.user_id,
        override_count,
        state.config().countries(),
    )?;
    room.publish_state();
    info!(room = %room.core.code, "memory game started");
    Ok(Ack::ok())
}

/// Turn one card face up with the turn. A mismatching second card arms the
/// deferred flip-back.
pub async fn pick(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: PickCardRequest,
) -> Result<PickCardResponse, ServiceError> {
    let room_arc = state.memory().resolve(code)?;
    let mut room = room_arc.lock().await;

    let index = usize::try_from(request.index).map_err(|_| ServiceError::InvalidIndex)?;
    let outcome = room.pick(&identity.user_id, index)?;

    if outcome == PickOutcome::Mismatch {
        schedule_mismatch_resolution(&room_arc, &mut room);
    }
    room.publish_state();

    Ok(match outcome {
        PickOutcome::Revealed => PickCardResponse {
            ok: true,
            matched: None,
            ended: None,
        },
        PickOutcome::Matched { ended } => PickCardResponse {
            ok: true,
            matched: Some(true),
            ended: ended.then_some(true),
        },
        PickOutcome::Mismatch => PickCardResponse {
            ok: true,
            matched: Some(false),
            ended: None,
        },
    })
}

/// Arm the deferred flip-back. The task re-acquires the room lock and
/// verifies its token and the room state before mutating, so a cancelled or
/// superseded task is a no-op.
fn schedule_mismatch_resolution(room_arc: &Arc<Mutex<MemoryRoom>>, room: &mut MemoryRoom) {
    let token = Uuid::new_v4();
    let arc = Arc::clone(room_arc);

    let handle = tokio::spawn(async move {
        sleep(MISMATCH_RESOLVE_DELAY).await;

        let mut room = arc.lock().await;
        if !room.core.timer.matches(token) {
            return;
        }
        room.core.timer.disarm(token);

        if room.core.status != RoomStatus::Playing || !room.resolving {
            return;
        }

        room.resolve_mismatch();
        room.publish_state();
    });

    room.core.timer.arm(token, handle);
}
