use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        gomoku::{BOARD_SIZE, GomokuRoom, Stone},
        room::RoomStatus,
    },
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceStoneRequest {
    pub index: i64,
}

/// `ended`/`draw` are only present when the move finished the game.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceStoneResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinGomokuResponse {
    pub ok: bool,
    pub room: GomokuSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GomokuPlayerSnapshot {
    pub user_id: String,
    pub username: String,
    pub joined_at: String,
    pub online: bool,
    pub stone: Option<Stone>,
}

/// Public snapshot of a Gomoku room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GomokuSnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub host_user_id: Option<String>,
    pub created_at: String,
    pub players: Vec<GomokuPlayerSnapshot>,
    pub turn_order: Vec<String>,
    pub turn_user_id: Option<String>,
    pub board_size: usize,
    /// Row-major cells, null where empty.
    pub board: Vec<Option<Stone>>,
    pub winner_user_id: Option<String>,
    pub winner_username: Option<String>,
    pub winner_stone: Option<Stone>,
    pub draw: bool,
    pub last_move_index: Option<usize>,
    pub last_move_by_user_id: Option<String>,
}

impl From<&GomokuRoom> for GomokuSnapshot {
    fn from(room: &GomokuRoom) -> Self {
        Self {
            code: room.core.code.clone(),
            status: room.core.status,
            host_user_id: room.core.host_user_id.clone(),
            created_at: format_system_time(room.core.created_at),
            players: room
                .core
                .players
                .values()
                .map(|player| GomokuPlayerSnapshot {
                    user_id: player.user_id.clone(),
                    username: player.username.clone(),
                    joined_at: format_system_time(player.joined_at),
                    online: player.online,
                    stone: player.stone,
                })
                .collect(),
            turn_order: room.core.turns.order().to_vec(),
            turn_user_id: room.core.turn_user_id().map(str::to_string),
            board_size: BOARD_SIZE,
            board: room.board.clone(),
            winner_user_id: room.winner.as_ref().map(|w| w.user_id.clone()),
            winner_username: room.winner.as_ref().map(|w| w.username.clone()),
            winner_stone: room.winner.as_ref().map(|w| w.stone),
            draw: room.draw,
            last_move_index: room.last_move_index,
            last_move_by_user_id: room.last_move_by_user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn stones_serialize_as_single_letters() {
        let host = Identity {
            user_id: "u-1".into(),
            username: "alice".into(),
        };
        let mut room = GomokuRoom::new("AB23CD".into(), &host);
        room.seat_player(&Identity {
            user_id: "u-2".into(),
            username: "bob".into(),
        });
        room.start("u-1").unwrap();
        room.place("u-1", 7).unwrap();

        let encoded = serde_json::to_string(&GomokuSnapshot::from(&room)).unwrap();
        assert!(encoded.contains("\"stone\":\"B\""));
        assert!(encoded.contains("\"lastMoveIndex\":7"));
    }
}
