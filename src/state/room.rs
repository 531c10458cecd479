use std::{collections::HashMap, time::SystemTime};

use indexmap::IndexMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    state::{sse::SseHub, turns::TurnState},
};

/// Lifecycle of a room. Transitions only ever move forward:
/// `lobby → playing → ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Lobby,
    Playing,
    Ended,
}

/// Common behavior every per-game player record exposes to the shared room
/// plumbing. Game-specific fields stay on the concrete structs.
pub trait Seat {
    fn online(&self) -> bool;
    fn set_online(&mut self, online: bool);
    fn is_bot(&self) -> bool {
        false
    }
}

/// Cancellable deferred task attached to a room (the Bingo bot draw or the
/// Memory mismatch resolution). The token is compared by the task itself
/// after it re-acquires the room lock, so a stale task that lost a race with
/// `cancel` never mutates the room.
#[derive(Debug, Default)]
pub struct TimerSlot {
    armed: Option<(Uuid, JoinHandle<()>)>,
}

impl TimerSlot {
    /// Replace any outstanding task with a freshly spawned one.
    pub fn arm(&mut self, token: Uuid, handle: JoinHandle<()>) {
        self.cancel();
        self.armed = Some((token, handle));
    }

    /// Abort the outstanding task, if any.
    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.armed.take() {
            handle.abort();
        }
    }

    /// Whether `token` still identifies the current task.
    pub fn matches(&self, token: Uuid) -> bool {
        matches!(self.armed, Some((armed, _)) if armed == token)
    }

    /// Forget the task identified by `token`; called by the task itself once
    /// it has run.
    pub fn disarm(&mut self, token: Uuid) {
        if self.matches(token) {
            self.armed = None;
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// State shared by every room regardless of game: membership in join order,
/// presence refcounts, the turn cursor, the broadcast hub, and the deferred
/// task slot. All of it is guarded by the room's `tokio::sync::Mutex`.
#[derive(Debug)]
pub struct RoomCore<P> {
    pub code: String,
    pub status: RoomStatus,
    pub host_user_id: Option<String>,
    pub created_at: SystemTime,
    /// Insertion order is the canonical turn order.
    pub players: IndexMap<String, P>,
    /// Live stream count per player; `online` mirrors `count > 0`.
    pub connections: HashMap<String, u32>,
    pub turns: TurnState,
    pub hub: SseHub,
    pub timer: TimerSlot,
}

impl<P: Seat> RoomCore<P> {
    pub fn new(code: String, host_user_id: &str) -> Self {
        Self {
            code,
            status: RoomStatus::Lobby,
            host_user_id: Some(host_user_id.to_string()),
            created_at: SystemTime::now(),
            players: IndexMap::new(),
            connections: HashMap::new(),
            turns: TurnState::default(),
            hub: SseHub::new(),
            timer: TimerSlot::default(),
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.players.contains_key(user_id)
    }

    /// The user holding the turn; null outside of play.
    pub fn turn_user_id(&self) -> Option<&str> {
        if self.status == RoomStatus::Playing {
            self.turns.current()
        } else {
            None
        }
    }

    pub fn ensure_playing(&self) -> Result<(), ServiceError> {
        if self.status == RoomStatus::Playing {
            Ok(())
        } else {
            Err(ServiceError::NotPlaying)
        }
    }

    pub fn ensure_member(&self, user_id: &str) -> Result<(), ServiceError> {
        if self.is_member(user_id) {
            Ok(())
        } else {
            Err(ServiceError::NotInRoom)
        }
    }

    pub fn ensure_host(&self, user_id: &str) -> Result<(), ServiceError> {
        if self.host_user_id.as_deref() == Some(user_id) {
            Ok(())
        } else {
            Err(ServiceError::HostOnly)
        }
    }

    pub fn ensure_turn(&self, user_id: &str) -> Result<(), ServiceError> {
        if self.turn_user_id() == Some(user_id) {
            Ok(())
        } else {
            Err(ServiceError::NotYourTurn)
        }
    }

    /// Record one more live stream for `user_id` and flip them online.
    pub fn connect(&mut self, user_id: &str) {
        *self.connections.entry(user_id.to_string()).or_insert(0) += 1;
        if let Some(player) = self.players.get_mut(user_id) {
            player.set_online(true);
        }
    }

    /// Drop one live stream for `user_id`. Returns true when this was their
    /// last stream and the player just went offline.
    pub fn disconnect(&mut self, user_id: &str) -> bool {
        let Some(count) = self.connections.get_mut(user_id) else {
            return false;
        };

        *count = count.saturating_sub(1);
        if *count > 0 {
            return false;
        }

        self.connections.remove(user_id);
        if let Some(player) = self.players.get_mut(user_id) {
            player.set_online(false);
        }
        true
    }

    pub fn connection_count(&self, user_id: &str) -> u32 {
        self.connections.get(user_id).copied().unwrap_or(0)
    }

    /// Remove a player and their presence entry.
    pub fn remove_player(&mut self, user_id: &str) -> Option<P> {
        self.connections.remove(user_id);
        self.players.shift_remove(user_id)
    }

    pub fn human_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_bot()).count()
    }

    /// Hand the host seat to the next surviving human in join order, skipping
    /// `departed`. The host becomes null when only the bot remains.
    pub fn transfer_host_from(&mut self, departed: &str) {
        self.host_user_id = self
            .players
            .iter()
            .find(|(id, player)| id.as_str() != departed && !player.is_bot())
            .map(|(id, _)| id.clone());
    }

    /// Move to `ended` and cancel any outstanding deferred task.
    pub fn finish(&mut self) {
        self.status = RoomStatus::Ended;
        self.timer.cancel();
    }
}

/// Capability set shared by the four room kinds so the stream plumbing and
/// registries can stay generic.
pub trait GameRoom: Send + 'static {
    type Player: Seat;

    fn core(&self) -> &RoomCore<Self::Player>;
    fn core_mut(&mut self) -> &mut RoomCore<Self::Player>;

    /// Serialize the public snapshot exactly once.
    fn state_event(&self) -> serde_json::Result<ServerEvent>;

    /// Broadcast the current snapshot to every subscriber, best-effort.
    fn publish_state(&self) {
        match self.state_event() {
            Ok(event) => self.core().hub.broadcast(event),
            Err(err) => warn!(error = %err, "failed to serialize state snapshot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestPlayer {
        online: bool,
        bot: bool,
    }

    impl Seat for TestPlayer {
        fn online(&self) -> bool {
            self.online
        }
        fn set_online(&mut self, online: bool) {
            self.online = online;
        }
        fn is_bot(&self) -> bool {
            self.bot
        }
    }

    fn room_with(players: &[(&str, bool)]) -> RoomCore<TestPlayer> {
        let mut core = RoomCore::new("AB23CD".into(), players[0].0);
        for (id, bot) in players {
            core.players.insert(
                (*id).to_string(),
                TestPlayer {
                    online: false,
                    bot: *bot,
                },
            );
        }
        core
    }

    #[test]
    fn online_tracks_connection_count() {
        let mut core = room_with(&[("a", false)]);

        core.connect("a");
        core.connect("a");
        assert!(core.players["a"].online());
        assert_eq!(core.connection_count("a"), 2);

        assert!(!core.disconnect("a"));
        assert!(core.players["a"].online());

        assert!(core.disconnect("a"));
        assert!(!core.players["a"].online());
        assert_eq!(core.connection_count("a"), 0);
    }

    #[test]
    fn disconnect_never_goes_negative() {
        let mut core = room_with(&[("a", false)]);
        assert!(!core.disconnect("a"));
        assert_eq!(core.connection_count("a"), 0);
    }

    #[test]
    fn host_transfer_prefers_humans_in_join_order() {
        let mut core = room_with(&[("a", false), ("bot", true), ("b", false)]);
        core.transfer_host_from("a");
        assert_eq!(core.host_user_id.as_deref(), Some("b"));
    }

    #[test]
    fn host_transfer_yields_null_when_only_the_bot_remains() {
        let mut core = room_with(&[("a", false), ("bot", true)]);
        core.remove_player("a");
        core.transfer_host_from("a");
        assert_eq!(core.host_user_id, None);
    }

    #[test]
    fn turn_user_is_null_outside_of_play() {
        let mut core = room_with(&[("a", false), ("b", false)]);
        core.turns.seed(["a", "b"]);
        assert_eq!(core.turn_user_id(), None);

        core.status = RoomStatus::Playing;
        assert_eq!(core.turn_user_id(), Some("a"));

        core.finish();
        assert_eq!(core.turn_user_id(), None);
    }

    #[tokio::test]
    async fn timer_slot_identity_survives_rearming() {
        let mut slot = TimerSlot::default();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        slot.arm(first, tokio::spawn(async {}));
        assert!(slot.matches(first));

        slot.arm(second, tokio::spawn(async {}));
        assert!(!slot.matches(first));
        assert!(slot.matches(second));

        slot.disarm(second);
        assert!(!slot.is_armed());
    }
}
