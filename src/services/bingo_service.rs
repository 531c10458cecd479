use std::sync::Arc;

use tokio::{sync::Mutex, time::sleep};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::{
        bingo::{
            BingoSnapshot, CreateBingoRequest, DrawRequest, DrawResponse, JoinBingoResponse,
            StartBingoRequest,
        },
        common::{Ack, CreatedResponse},
    },
    error::ServiceError,
    identity::{BOT_USER_ID, Identity},
    state::{
        SharedState,
        bingo::{BOT_DRAW_DELAY, BingoRoom, DRAW_TIMEOUT_CHOICES, DrawReason, MAX_SIZE, MIN_SIZE},
        room::{GameRoom, RoomStatus},
    },
};

/// Humans per room; the bot seat does not count against it.
pub const MAX_HUMANS: usize = 8;

/// Open a room with the caller as host. With `vsComputer` the bot is seated
/// immediately.
pub async fn create_room(
    state: &SharedState,
    identity: &Identity,
    request: CreateBingoRequest,
) -> Result<CreatedResponse, ServiceError> {
    let size = usize::try_from(request.size)
        .ok()
        .filter(|size| (MIN_SIZE..=MAX_SIZE).contains(size))
        .ok_or(ServiceError::InvalidSize)?;

    let (code, _room) = state
        .bingo()
        .create(|code| BingoRoom::new(code, identity, size, request.vs_computer))?;

    info!(room = %code, user = %identity.user_id, size, "bingo room created");
    Ok(CreatedResponse::new(code))
}

/// Seat the caller, or succeed idempotently when they are already in.
pub async fn join(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<JoinBingoResponse, ServiceError> {
    let room_arc = state.bingo().resolve(code)?;
    let mut room = room_arc.lock().await;

    if !room.core.is_member(&identity.user_id) {
        if room.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }
        if room.core.human_count() >= MAX_HUMANS {
            return Err(ServiceError::RoomFull);
        }

        room.seat_player(identity, false);
        room.sync_bot_seat();
        room.publish_state();
    }

    let board = room
        .core
        .players
        .get(&identity.user_id)
        .map(|p| p.board.clone());
    Ok(JoinBingoResponse {
        ok: true,
        room: BingoSnapshot::from(&*room),
        board,
    })
}

/// Remove the caller. Rooms with no humans left are collected even when the
/// bot still holds a seat.
pub async fn leave(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<Ack, ServiceError> {
    let room_arc = state.bingo().resolve(code)?;
    let mut room = room_arc.lock().await;

    if !room.core.is_member(&identity.user_id) {
        return Ok(Ack::ok());
    }

    let was_host = room.core.host_user_id.as_deref() == Some(identity.user_id.as_str());
    room.core.remove_player(&identity.user_id);
    room.core.turns.remove(&identity.user_id);
    if was_host {
        room.core.transfer_host_from(&identity.user_id);
    }
    room.sync_bot_seat();

    if room.core.status == RoomStatus::Playing && room.core.turns.is_empty() {
        room.core.finish();
    }

    if room.core.human_count() == 0 {
        // Cancel the deferred draw now: the bot task holds its own Arc to the
        // room and would otherwise outlive the registry entry.
        room.core.timer.cancel();
        state.bingo().remove(&room.core.code);
        info!(room = %room.core.code, "bingo room collected");
    } else {
        room.publish_state();
    }

    Ok(Ack::ok())
}

/// Host-only start with the draw-timer hint.
pub async fn start(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: StartBingoRequest,
) -> Result<Ack, ServiceError> {
    let room_arc = state.bingo().resolve(code)?;
    let mut room = room_arc.lock().await;

    let draw_timeout = u32::try_from(request.draw_timeout_seconds)
        .ok()
        .filter(|value| DRAW_TIMEOUT_CHOICES.contains(value))
        .ok_or(ServiceError::InvalidDrawTimeoutSeconds)?;

    room.start(&identity.user_id, draw_timeout)?;
    room.publish_state();
    info!(room = %room.core.code, "bingo game started");
    Ok(Ack::ok())
}

/// Manual call by the player holding the turn.
pub async fn draw(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: DrawRequest,
) -> Result<DrawResponse, ServiceError> {
    let room_arc = state.bingo().resolve(code)?;
    let mut room = room_arc.lock().await;

    let number = u16::try_from(request.number).map_err(|_| ServiceError::InvalidNumber)?;
    let outcome = room.draw(&identity.user_id, DrawReason::ManualPick, number)?;

    if outcome.bot_turn_next {
        schedule_bot_draw(&room_arc, &mut room);
    }
    room.publish_state();

    Ok(DrawResponse {
        ok: true,
        number: outcome.number,
    })
}

/// Arm the deferred bot draw. The task re-acquires the room lock and verifies
/// both its token and the game state before touching anything, so any later
/// mutation that cancelled or replaced it turns it into a no-op.
fn schedule_bot_draw(room_arc: &Arc<Mutex<BingoRoom>>, room: &mut BingoRoom) {
    let token = Uuid::new_v4();
    let arc = Arc::clone(room_arc);

    let handle = tokio::spawn(async move {
        sleep(BOT_DRAW_DELAY).await;

        let mut room = arc.lock().await;
        if !room.core.timer.matches(token) {
            return;
        }
        room.core.timer.disarm(token);

        if room.core.status != RoomStatus::Playing
            || room.core.turn_user_id() != Some(BOT_USER_ID)
        {
            return;
        }

        let Some(number) = room.random_remaining() else {
            return;
        };

        match room.draw(BOT_USER_ID, DrawReason::BotPick, number) {
            Ok(outcome) => {
                if outcome.bot_turn_next {
                    schedule_bot_draw(&arc, &mut room);
                }
                room.publish_state();
            }
            Err(err) => debug!(error = %err, "bot draw skipped"),
        }
    });

    room.core.timer.arm(token, handle);
}
