use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::format_system_time,
    state::{
        memory::{MemoryRoom, MemoryWinner},
        room::RoomStatus,
    },
};

/// Payload used to open a new Flag Memory room.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoryRequest {
    /// Deck size, one of 20, 30, 40, 50 or 60. Defaults to 20.
    pub card_count: Option<i64>,
}

/// Options the host may override when starting the game.
#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartMemoryRequest {
    pub card_count: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PickCardRequest {
    pub index: i64,
}

/// `matched`/`ended` are only present once a second card has been turned.
#[derive(Debug, Serialize, ToSchema)]
pub struct PickCardResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JoinMemoryResponse {
    pub ok: bool,
    pub room: MemorySnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryPlayerSnapshot {
    pub user_id: String,
    pub username: String,
    pub joined_at: String,
    pub online: bool,
    pub score: u32,
}

/// One card as subscribers see it. Face-down cards keep their identity
/// hidden: only `uid` and `matched` survive, everything else is null.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCardSnapshot {
    pub uid: Uuid,
    pub matched: bool,
    pub visible: bool,
    pub country_key: Option<String>,
    pub flag: Option<String>,
    pub name_ko: Option<String>,
}

/// Public snapshot of a Flag Memory room. A card is visible iff it is part of
/// the current attempt or already matched; the masking is identical for every
/// viewer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub code: String,
    pub status: RoomStatus,
    pub host_user_id: Option<String>,
    pub created_at: String,
    pub players: Vec<MemoryPlayerSnapshot>,
    pub turn_order: Vec<String>,
    pub turn_user_id: Option<String>,
    pub card_count: usize,
    pub cards: Vec<MemoryCardSnapshot>,
    pub matched_count: usize,
    pub revealed_indices: Vec<usize>,
    pub resolving: bool,
    pub winners: Vec<MemoryWinner>,
}

impl From<&MemoryRoom> for MemorySnapshot {
    fn from(room: &MemoryRoom) -> Self {
        Self {
            code: room.core.code.clone(),
            status: room.core.status,
            host_user_id: room.core.host_user_id.clone(),
            created_at: format_system_time(room.core.created_at),
            players: room
                .core
                .players
                .values()
                .map(|player| MemoryPlayerSnapshot {
                    user_id: player.user_id.clone(),
                    username: player.username.clone(),
                    joined_at: format_system_time(player.joined_at),
                    online: player.online,
                    score: player.score,
                })
                .collect(),
            turn_order: room.core.turns.order().to_vec(),
            turn_user_id: room.core.turn_user_id().map(str::to_string),
            card_count: room.card_count,
            cards: room
                .cards
                .iter()
                .enumerate()
                .map(|(index, card)| {
                    let visible = room.is_card_visible(index);
                    MemoryCardSnapshot {
                        uid: card.uid,
                        matched: card.matched,
                        visible,
                        country_key: visible.then(|| card.country_key.clone()),
                        flag: visible.then(|| card.flag.clone()),
                        name_ko: visible.then(|| card.name_ko.clone()),
                    }
                })
                .collect(),
            matched_count: room.matched_count,
            revealed_indices: room.revealed_indices.clone(),
            resolving: room.resolving,
            winners: room.winners.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identity::Identity, state::memory::Country};

    fn catalogue() -> Vec<Country> {
        (0..10)
            .map(|i| Country {
                key: format!("c{i}"),
                flag: "🏳".to_string(),
                name_ko: format!("나라{i}"),
            })
            .collect()
    }

    #[test]
    fn face_down_cards_are_masked() {
        let host = Identity {
            user_id: "u-1".into(),
            username: "alice".into(),
        };
        let mut room = MemoryRoom::new("AB23CD".into(), &host, 20);
        room.start("u-1", None, &catalogue()).unwrap();
        room.pick("u-1", 0).unwrap();

        let snapshot = MemorySnapshot::from(&room);

        let up = &snapshot.cards[0];
        assert!(up.visible);
        assert!(up.country_key.is_some());
        assert!(up.flag.is_some());

        let down = &snapshot.cards[1];
        assert!(!down.visible);
        assert!(!down.matched);
        assert!(down.country_key.is_none());
        assert!(down.flag.is_none());
        assert!(down.name_ko.is_none());
    }
}
