use std::{collections::BTreeSet, time::SystemTime};

use rand::Rng;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{croc::CrocSnapshot, sse::ServerEvent},
    error::ServiceError,
    identity::Identity,
    state::room::{GameRoom, RoomCore, RoomStatus, Seat},
};

pub const MIN_TOOTH_COUNT_PER_JAW: u16 = 8;
pub const MAX_TOOTH_COUNT_PER_JAW: u16 = 20;
pub const DEFAULT_TOOTH_COUNT_PER_JAW: u16 = 10;

#[derive(Debug)]
pub struct CrocPlayer {
    pub user_id: String,
    pub username: String,
    pub joined_at: SystemTime,
    pub online: bool,
    pub alive: bool,
}

impl CrocPlayer {
    fn new(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            joined_at: SystemTime::now(),
            online: false,
            alive: true,
        }
    }
}

impl Seat for CrocPlayer {
    fn online(&self) -> bool {
        self.online
    }
    fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

/// Identifies the loser and winner once the trap snaps shut.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrocPlayerRef {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PickOutcome {
    pub trap: bool,
    pub ended: bool,
}

#[derive(Debug)]
pub struct CrocRoom {
    pub core: RoomCore<CrocPlayer>,
    pub tooth_count_per_jaw: u16,
    /// The losing position, drawn at start. Hidden from snapshots until the
    /// game ends.
    pub trap_tooth: Option<u16>,
    pub selected_teeth: BTreeSet<u16>,
    pub last_picked_tooth: Option<u16>,
    pub last_picker_user_id: Option<String>,
    pub loser: Option<CrocPlayerRef>,
    pub winner: Option<CrocPlayerRef>,
}

impl CrocRoom {
    pub fn new(code: String, host: &Identity, tooth_count_per_jaw: u16) -> Self {
        let mut room = Self {
            core: RoomCore::new(code, &host.user_id),
            tooth_count_per_jaw,
            trap_tooth: None,
            selected_teeth: BTreeSet::new(),
            last_picked_tooth: None,
            last_picker_user_id: None,
            loser: None,
            winner: None,
        };
        room.seat_player(host);
        room
    }

    pub fn seat_player(&mut self, identity: &Identity) {
        self.core
            .players
            .insert(identity.user_id.clone(), CrocPlayer::new(identity));
    }

    pub fn tooth_ceiling(&self) -> u16 {
        self.tooth_count_per_jaw * 2
    }

    /// Host-only transition from the lobby into play: draws the trap tooth
    /// and resets the jaw.
    pub fn start(
        &mut self,
        actor: &str,
        tooth_count_per_jaw: Option<u16>,
    ) -> Result<(), ServiceError> {
        self.core.ensure_host(actor)?;
        if self.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }

        let tooth_count = tooth_count_per_jaw.unwrap_or(self.tooth_count_per_jaw);
        if !(MIN_TOOTH_COUNT_PER_JAW..=MAX_TOOTH_COUNT_PER_JAW).contains(&tooth_count) {
            return Err(ServiceError::InvalidToothCountPerJaw);
        }
        if self.core.players.len() < 2 {
            return Err(ServiceError::NeedTwoPlayers);
        }

        self.tooth_count_per_jaw = tooth_count;
        let mut rng = rand::rng();
        self.trap_tooth = Some(rng.random_range(1..=self.tooth_ceiling()));
        self.selected_teeth.clear();
        self.last_picked_tooth = None;
        self.last_picker_user_id = None;
        self.loser = None;
        self.winner = None;
        for player in self.core.players.values_mut() {
            player.alive = true;
        }

        self.core.status = RoomStatus::Playing;
        let order: Vec<String> = self.core.players.keys().cloned().collect();
        self.core.turns.seed(order);

        Ok(())
    }

    /// Apply one pick by the player holding the turn.
    pub fn pick(&mut self, actor: &str, tooth: u16) -> Result<PickOutcome, ServiceError> {
        self.core.ensure_playing()?;
        self.core.ensure_turn(actor)?;

        if tooth < 1 || tooth > self.tooth_ceiling() {
            return Err(ServiceError::InvalidTooth);
        }
        if self.selected_teeth.contains(&tooth) {
            return Err(ServiceError::AlreadySelected);
        }

        self.selected_teeth.insert(tooth);
        self.last_picked_tooth = Some(tooth);
        self.last_picker_user_id = Some(actor.to_string());

        if Some(tooth) == self.trap_tooth {
            self.resolve_trap(actor);
            return Ok(PickOutcome {
                trap: true,
                ended: true,
            });
        }

        self.core.turns.advance();
        Ok(PickOutcome {
            trap: false,
            ended: false,
        })
    }

    /// The picker loses; the first other player in turn order wins. With two
    /// players this is exactly the opponent.
    fn resolve_trap(&mut self, picker: &str) {
        if let Some(player) = self.core.players.get_mut(picker) {
            player.alive = false;
        }

        self.loser = self.core.players.get(picker).map(|p| CrocPlayerRef {
            user_id: p.user_id.clone(),
            username: p.username.clone(),
        });

        let winner_id = self
            .core
            .turns
            .order()
            .iter()
            .find(|id| id.as_str() != picker)
            .cloned();
        self.winner = winner_id
            .and_then(|id| self.core.players.get(&id))
            .map(|p| CrocPlayerRef {
                user_id: p.user_id.clone(),
                username: p.username.clone(),
            });

        self.core.finish();
    }
}

impl GameRoom for CrocRoom {
    type Player = CrocPlayer;

    fn core(&self) -> &RoomCore<CrocPlayer> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore<CrocPlayer> {
        &mut self.core
    }

    fn state_event(&self) -> serde_json::Result<ServerEvent> {
        ServerEvent::state(&CrocSnapshot::from(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            user_id: id.to_string(),
            username: id.to_string(),
        }
    }

    fn started_room() -> CrocRoom {
        let mut room = CrocRoom::new("AB23CD".into(), &identity("a"), 10);
        room.seat_player(&identity("b"));
        room.start("a", None).unwrap();
        room
    }

    #[test]
    fn start_requires_host_roster_and_valid_jaw() {
        let mut room = CrocRoom::new("AB23CD".into(), &identity("a"), 10);
        assert_eq!(
            room.start("a", None).unwrap_err(),
            ServiceError::NeedTwoPlayers
        );

        room.seat_player(&identity("b"));
        assert_eq!(room.start("b", None).unwrap_err(), ServiceError::HostOnly);
        assert_eq!(
            room.start("a", Some(7)).unwrap_err(),
            ServiceError::InvalidToothCountPerJaw
        );

        room.start("a", Some(12)).unwrap();
        assert_eq!(room.tooth_count_per_jaw, 12);
        let trap = room.trap_tooth.unwrap();
        assert!((1..=24).contains(&trap));
        assert!(room.core.players.values().all(|p| p.alive));
    }

    #[test]
    fn safe_pick_passes_the_turn() {
        let mut room = started_room();
        room.trap_tooth = Some(7);

        let outcome = room.pick("a", 3).unwrap();
        assert!(!outcome.trap);
        assert_eq!(room.core.turn_user_id(), Some("b"));
        assert_eq!(room.last_picked_tooth, Some(3));
        assert_eq!(room.last_picker_user_id.as_deref(), Some("a"));
    }

    #[test]
    fn trap_pick_ends_the_game_with_loser_and_winner() {
        let mut room = started_room();
        room.trap_tooth = Some(7);

        room.pick("a", 3).unwrap();
        let outcome = room.pick("b", 7).unwrap();
        assert!(outcome.trap);
        assert!(outcome.ended);

        assert_eq!(room.core.status, RoomStatus::Ended);
        assert_eq!(room.loser.as_ref().unwrap().user_id, "b");
        assert_eq!(room.winner.as_ref().unwrap().user_id, "a");
        assert!(!room.core.players["b"].alive);
        assert!(room.core.players["a"].alive);

        assert_eq!(room.pick("a", 4).unwrap_err(), ServiceError::NotPlaying);
    }

    #[test]
    fn pick_validates_turn_and_tooth() {
        let mut room = started_room();
        room.trap_tooth = Some(7);

        assert_eq!(room.pick("b", 3).unwrap_err(), ServiceError::NotYourTurn);
        assert_eq!(room.pick("a", 0).unwrap_err(), ServiceError::InvalidTooth);
        assert_eq!(room.pick("a", 21).unwrap_err(), ServiceError::InvalidTooth);

        room.pick("a", 3).unwrap();
        assert_eq!(
            room.pick("b", 3).unwrap_err(),
            ServiceError::AlreadySelected
        );
    }
}
