use tracing::info;

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        croc::{
            CreateCrocRequest, CrocSnapshot, JoinCrocResponse, PickToothRequest,
            PickToothResponse, StartCrocRequest,
        },
    },
    error::ServiceError,
    identity::Identity,
    state::{
        SharedState,
        croc::{
            CrocRoom, DEFAULT_TOOTH_COUNT_PER_JAW, MAX_TOOTH_COUNT_PER_JAW,
            MIN_TOOTH_COUNT_PER_JAW,
        },
        room::{GameRoom, RoomStatus},
    },
};

fn validate_tooth_count(value: Option<i64>) -> Result<Option<u16>, ServiceError> {
    match value {
        None => Ok(None),
        Some(raw) => u16::try_from(raw)
            .ok()
            .filter(|count| (MIN_TOOTH_COUNT_PER_JAW..=MAX_TOOTH_COUNT_PER_JAW).contains(count))
            .map(Some)
            .ok_or(ServiceError::InvalidToothCountPerJaw),
    }
}

/// Open a room with the caller as host.
pub async fn create_room(
    state: &SharedState,
    identity: &Identity,
    request: CreateCrocRequest,
) -> Result<CreatedResponse, ServiceError> {
    let tooth_count =
        validate_tooth_count(request.tooth_count_per_jaw)?.unwrap_or(DEFAULT_TOOTH_COUNT_PER_JAW);

    let (code, _room) = state
        .croc()
        .create(|code| CrocRoom::new(code, identity, tooth_count))?;

    info!(room = %code, user = %identity.user_id, "croc room created");
    Ok(CreatedResponse::new(code))
}

/// Seat the caller, or succeed idempotently when they are already in.
pub async fn join(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<JoinCrocResponse, ServiceError> {
    let room_arc = state.croc().resolve(code)?;
    let mut room = room_arc.lock().await;

    if !room.core.is_member(&identity.user_id) {
        if room.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }
        room.seat_player(identity);
        room.publish_state();
    }

    Ok(JoinCrocResponse {
        ok: true,
        room: CrocSnapshot::from(&*room),
    })
}

/// Remove the caller, collecting the room once it empties.
pub async fn leave(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<Ack, ServiceError> {
    let room_arc = state.croc().resolve(code)?;
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

    if room.core.status == RoomStatus::Playing && room.core.turns.is_empty() {
        room.core.finish();
    }

    if room.core.players.is_empty() {
        state.croc().remove(&room.core.code);
        info!(room = %room.core.code, "croc room collected");
    } else {
        room.publish_state();
    }

    Ok(Ack::ok())
}

/// Host-only start: draws the trap and resets the jaw.
pub async fn start(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: StartCrocRequest,
) -> Result<Ack, ServiceError> {
    let room_arc = state.croc().resolve(code)?;
    let mut room = room_arc.lock().await;

    let override_count = validate_tooth_count(request.tooth_count_per_jaw)?;
    room.start(&identity.user_id, override_count)?;
    room.publish_state();
    info!(room = %room.core.code, "croc game started");
    Ok(Ack::ok())
}

/// Pick one tooth with the turn.
pub async fn pick(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: PickToothRequest,
) -> Result<PickToothResponse, ServiceError> {
    let room_arc = state.croc().resolve(code)?;
    let mut room = room_arc.lock().await;

    let tooth = u16::try_from(request.tooth).map_err(|_| ServiceError::InvalidTooth)?;
    let outcome = room.pick(&identity.user_id, tooth)?;
    room.publish_state();

    Ok(PickToothResponse {
        ok: true,
        trap: outcome.trap,
    })
}
