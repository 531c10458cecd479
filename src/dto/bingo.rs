use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        bingo::{BingoRoom, BingoWinner, DrawReason, TARGET_LINES},
        room::RoomStatus,
    },
};

/// Payload used to open a new Bingo room.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBingoRequest {
    /// Board side length, 5..=10.
    pub size: i64,
    /// Seat the server bot when at most one human is present.
    #[serde(default)]
    pub vs_computer: bool,
}

fn default_draw_timeout() -> i64 {
    10
}

/// Options the host picks when starting the game.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartBingoRequest {
    /// Client-side draw timer hint; one of 3, 5, 7, 10, 15 or 20.
    #[serde(default = "default_draw_timeout")]
    pub draw_timeout_seconds: i64,
}

/// A manual number call.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DrawRequest {
    pub number: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    pub ok: bool,
    pub number: u16,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinBingoResponse {
    pub ok: bool,
    pub room: BingoSnapshot,
    /// The caller's own board, echoed for convenience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Vec<Vec<u16>>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BingoPlayerSnapshot {
    pub user_id: String,
    pub username: String,
    pub joined_at: String,
    pub online: bool,
    pub is_bot: bool,
    pub board: Vec<Vec<u16>>,
}

/// Public snapshot of a Bingo room. Boards are open information; Bingo has no
/// hidden per-player state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BingoSnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub host_user_id: Option<String>,
    pub created_at: String,
    pub players: Vec<BingoPlayerSnapshot>,
    pub turn_order: Vec<String>,
    pub turn_user_id: Option<String>,
    pub size: usize,
    pub target_lines: u32,
    pub bot_enabled: bool,
    pub called_numbers: Vec<u16>,
    pub last_number: Option<u16>,
    pub winners: Vec<BingoWinner>,
    pub draw_timeout_seconds: u32,
    /// Deadline of the armed bot draw; null on human turns.
    pub turn_ends_at: Option<String>,
    pub last_draw_by_user_id: Option<String>,
    pub last_draw_by_username: Option<String>,
    pub last_draw_reason: Option<DrawReason>,
}

impl From<&BingoRoom> for BingoSnapshot {
    fn from(room: &BingoRoom) -> Self {
        Self {
            code: room.core.code.clone(),
            status: room.core.status,
            host_user_id: room.core.host_user_id.clone(),
            created_at: format_system_time(room.core.created_at),
            players: room
                .core
                .players
                .values()
                .map(|player| BingoPlayerSnapshot {
                    user_id: player.user_id.clone(),
                    username: player.username.clone(),
                    joined_at: format_system_time(player.joined_at),
                    online: player.online,
                    is_bot: player.is_bot,
                    board: player.board.clone(),
                })
                .collect(),
            turn_order: room.core.turns.order().to_vec(),
            turn_user_id: room.core.turn_user_id().map(str::to_string),
            size: room.size,
            target_lines: TARGET_LINES,
            bot_enabled: room.bot_enabled,
            called_numbers: room.called.iter().copied().collect(),
            last_number: room.last_number,
            winners: room.winners.clone(),
            draw_timeout_seconds: room.draw_timeout_seconds,
            turn_ends_at: room.turn_ends_at.map(format_system_time),
            last_draw_by_user_id: room.last_draw.as_ref().map(|d| d.user_id.clone()),
            last_draw_by_username: room.last_draw.as_ref().map(|d| d.username.clone()),
            last_draw_reason: room.last_draw.as_ref().map(|d| d.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn snapshot_encoding_is_deterministic() {
        let host = Identity {
            user_id: "u-1".into(),
            username: "alice".into(),
        };
        let room = BingoRoom::new("AB23CD".into(), &host, 5, true);

        let first = serde_json::to_string(&BingoSnapshot::from(&room)).unwrap();
        let second = serde_json::to_string(&BingoSnapshot::from(&room)).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("\"calledNumbers\":[]"));
        assert!(first.contains("\"status\":\"lobby\""));
    }
}
