use tracing::info;

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        gomoku::{GomokuSnapshot, JoinGomokuResponse, PlaceStoneRequest, PlaceStoneResponse},
    },
    error::ServiceError,
    identity::Identity,
    state::{
        SharedState,
        gomoku::{GomokuRoom, MAX_PLAYERS},
        room::{GameRoom, RoomStatus},
    },
};

/// Open a room with the caller as host, who will take black.
pub async fn create_room(
    state: &SharedState,
    identity: &Identity,
) -> Result<CreatedResponse, ServiceError> {
    let (code, _room) = state
        .gomoku()
        .create(|code| GomokuRoom::new(code, identity))?;

    info!(room = %code, user = %identity.user_id, "gomoku room created");
    Ok(CreatedResponse::new(code))
}

/// Seat the caller, or succeed idempotently when they are already in. Rooms
/// hold exactly two seats.
pub async fn join(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<JoinGomokuResponse, ServiceError> {
    let room_arc = state.gomoku().resolve(code)?;
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

    Ok(JoinGomokuResponse {
        ok: true,
        room: GomokuSnapshot::from(&*room),
    })
}

/// Remove the caller. A departure mid-game forfeits: the remaining player
/// wins on the spot.
pub async fn leave(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<Ack, ServiceError> {
    let room_arc = state.gomoku().resolve(code)?;
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

    if room.core.status == RoomStatus::Playing && room.core.players.len() < MAX_PLAYERS {
        if room.core.players.is_empty() {
            room.core.finish();
        } else {
            room.declare_forfeit_winner();
        }
    }

    if room.core.players.is_empty() {
        state.gomoku().remove(&room.core.code);
        info!(room = %room.core.code, "gomoku room collected");
    } else {
        room.publish_state();
    }

    Ok(Ack::ok())
}

/// Host-only start; black opens.
pub async fn start(
    state: &SharedState,
    identity: &Identity,
    code: &str,
) -> Result<Ack, ServiceError> {
    let room_arc = state.gomoku().resolve(code)?;
    let mut room = room_arc.lock().await;

    room.start(&identity.user_id)?;
    room.publish_state();
    info!(room = %room.core.code, "gomoku game started");
    Ok(Ack::ok())
}

/// Place a stone with the turn.
pub async fn place(
    state: &SharedState,
    identity: &Identity,
    code: &str,
    request: PlaceStoneRequest,
) -> Result<PlaceStoneResponse, ServiceError> {
    let room_arc = state.gomoku().resolve(code)?;
    let mut room = room_arc.lock().await;

    let index = usize::try_from(request.index).map_err(|_| ServiceError::InvalidIndex)?;
    let outcome = room.place(&identity.user_id, index)?;
    room.publish_state();

    Ok(PlaceStoneResponse {
        ok: true,
        ended: outcome.ended.then_some(true),
        draw: outcome.draw.then_some(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState, state::gomoku::Stone};

    fn identity(id: &str) -> Identity {
        Identity {
            user_id: id.to_string(),
            username: id.to_string(),
        }
    }

    async fn started_room(state: &SharedState) -> String {
        let created = create_room(state, &identity("u-1")).await.unwrap();
        join(state, &identity("u-2"), &created.code).await.unwrap();
        start(state, &identity("u-1"), &created.code).await.unwrap();
        created.code
    }

    #[tokio::test]
    async fn third_player_is_rejected() {
        let state = AppState::new(AppConfig::default());
        let created = create_room(&state, &identity("u-1")).await.unwrap();
        join(&state, &identity("u-2"), &created.code).await.unwrap();

        let err = join(&state, &identity("u-3"), &created.code)
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::RoomFull);
    }

    #[tokio::test]
    async fn five_in_a_row_reports_the_end() {
        let state = AppState::new(AppConfig::default());
        let code = started_room(&state).await;

        let black = [112, 113, 114, 115, 116];
        let white = [0, 1, 2, 3];
        let mut response = None;
        for (i, &index) in black.iter().enumerate() {
            response = Some(
                place(&state, &identity("u-1"), &code, PlaceStoneRequest {
                    index: index as i64,
                })
                .await
                .unwrap(),
            );
            if i < white.len() {
                place(&state, &identity("u-2"), &code, PlaceStoneRequest {
                    index: white[i] as i64,
                })
                .await
                .unwrap();
            }
        }

        let response = response.unwrap();
        assert_eq!(response.ended, Some(true));
        assert_eq!(response.draw, None);

        let room_arc = state.gomoku().get(&code).unwrap();
        let room = room_arc.lock().await;
        assert_eq!(room.winner.as_ref().unwrap().stone, Stone::Black);

        drop(room);
        let err = place(&state, &identity("u-2"), &code, PlaceStoneRequest { index: 50 })
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::NotPlaying);
    }

    #[tokio::test]
    async fn leaving_mid_game_forfeits() {
        let state = AppState::new(AppConfig::default());
        let code = started_room(&state).await;

        leave(&state, &identity("u-1"), &code).await.unwrap();

        let room_arc = state.gomoku().get(&code).unwrap();
        let room = room_arc.lock().await;
        assert_eq!(room.core.status, RoomStatus::Ended);
        assert_eq!(room.winner.as_ref().unwrap().user_id, "u-2");
        assert_eq!(room.core.host_user_id.as_deref(), Some("u-2"));
    }
}
