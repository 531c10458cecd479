use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::format_system_time,
    state::{
        croc::{CrocPlayerRef, CrocRoom},
        room::RoomStatus,
    },
};

/// Payload used to open a new Crocodile Teeth room.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCrocRequest {
    /// Teeth per jaw, 8..=20. Defaults to 10.
    pub tooth_count_per_jaw: Option<i64>,
}

/// Options the host may override when starting the game.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCrocRequest {
    pub tooth_count_per_jaw: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PickToothRequest {
    pub tooth: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PickToothResponse {
    pub ok: bool,
    /// Whether the picked tooth was the trap.
    pub trap: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinCrocResponse {
    pub ok: bool,
    pub room: CrocSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrocPlayerSnapshot {
    pub user_id: String,
    pub username: String,
    pub joined_at: String,
    pub online: bool,
    pub alive: bool,
}

/// Public snapshot of a Crocodile Teeth room. The trap position is only
/// revealed once the jaw has snapped shut.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrocSnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub host_user_id: Option<String>,
    pub created_at: String,
    pub players: Vec<CrocPlayerSnapshot>,
    pub turn_order: Vec<String>,
    pub turn_user_id: Option<String>,
    pub tooth_count_per_jaw: u16,
    pub selected_teeth: Vec<u16>,
    pub last_picked_tooth: Option<u16>,
    pub last_picker_user_id: Option<String>,
    pub trap_tooth: Option<u16>,
    pub loser_user_id: Option<String>,
    pub loser_username: Option<String>,
    pub winner_user_id: Option<String>,
    pub winner_username: Option<String>,
}

impl From<&CrocRoom> for CrocSnapshot {
    fn from(room: &CrocRoom) -> Self {
        let reveal_trap = room.core.status == RoomStatus::Ended;
        let split = |r: &Option<CrocPlayerRef>| {
            (
                r.as_ref().map(|p| p.user_id.clone()),
                r.as_ref().map(|p| p.username.clone()),
            )
        };
        let (loser_user_id, loser_username) = split(&room.loser);
        let (winner_user_id, winner_username) = split(&room.winner);

        Self {
            code: room.core.code.clone(),
            status: room.core.status,
            host_user_id: room.core.host_user_id.clone(),
            created_at: format_system_time(room.core.created_at),
            players: room
                .core
                .players
                .values()
                .map(|player| CrocPlayerSnapshot {
                    user_id: player.user_id.clone(),
                    username: player.username.clone(),
                    joined_at: format_system_time(player.joined_at),
                    online: player.online,
                    alive: player.alive,
                })
                .collect(),
            turn_order: room.core.turns.order().to_vec(),
            turn_user_id: room.core.turn_user_id().map(str::to_string),
            tooth_count_per_jaw: room.tooth_count_per_jaw,
            selected_teeth: room.selected_teeth.iter().copied().collect(),
            last_picked_tooth: room.last_picked_tooth,
            last_picker_user_id: room.last_picker_user_id.clone(),
            trap_tooth: reveal_trap.then_some(room.trap_tooth).flatten(),
            loser_user_id,
            loser_username,
            winner_user_id,
            winner_username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn trap_tooth_stays_hidden_until_the_game_ends() {
        let host = Identity {
            user_id: "u-1".into(),
            username: "alice".into(),
        };
        let mut room = CrocRoom::new("AB23CD".into(), &host, 10);
        room.seat_player(&Identity {
            user_id: "u-2".into(),
            username: "bob".into(),
        });
        room.start("u-1", None).unwrap();
        room.trap_tooth = Some(7);

        let snapshot = CrocSnapshot::from(&room);
        assert_eq!(snapshot.trap_tooth, None);

        room.pick("u-1", 7).unwrap();
        let snapshot = CrocSnapshot::from(&room);
        assert_eq!(snapshot.trap_tooth, Some(7));
    }
}
