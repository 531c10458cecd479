use std::time::{Duration, SystemTime};

use rand::seq::SliceRandom;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{memory::MemorySnapshot, sse::ServerEvent},
    error::ServiceError,
    identity::Identity,
    state::room::{GameRoom, RoomCore, RoomStatus, Seat},
};

pub const CARD_COUNT_CHOICES: [usize; 5] = [20, 30, 40, 50, 60];
pub const DEFAULT_CARD_COUNT: usize = 20;

/// How long a mismatched pair stays face up before the deferred task flips it
/// back and passes the turn.
pub const MISMATCH_RESOLVE_DELAY: Duration = Duration::from_millis(1100);

/// One catalogue entry backing a pair of cards.
#[derive(Debug, Clone)]
pub struct Country {
    pub key: String,
    pub flag: String,
    pub name_ko: String,
}

#[derive(Debug, Clone)]
pub struct MemoryCard {
    pub uid: Uuid,
    pub country_key: String,
    pub flag: String,
    pub name_ko: String,
    pub matched: bool,
}

#[derive(Debug)]
pub struct MemoryPlayer {
    pub user_id: String,
    pub username: String,
    pub joined_at: SystemTime,
    pub online: bool,
    pub score: u32,
}

impl MemoryPlayer {
    fn new(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            joined_at: SystemTime::now(),
            online: false,
            score: 0,
        }
    }
}

impl Seat for MemoryPlayer {
    fn online(&self) -> bool {
        self.online
    }
    fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemoryWinner {
    pub user_id: String,
    pub username: String,
    pub score: u32,
}

/// What a legal pick did, so the coordinator can answer the caller and
/// schedule the mismatch resolution when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// First card of the attempt turned face up.
    Revealed,
    /// Second card matched the first; the actor keeps the turn.
    Matched { ended: bool },
    /// Second card did not match; the pair stays up until the deferred task
    /// flips it back.
    Mismatch,
}

#[derive(Debug)]
pub struct MemoryRoom {
    pub core: RoomCore<MemoryPlayer>,
    pub card_count: usize,
    pub cards: Vec<MemoryCard>,
    pub matched_count: usize,
    pub revealed_indices: Vec<usize>,
    pub resolving: bool,
    pub winners: Vec<MemoryWinner>,
}

impl MemoryRoom {
    pub fn new(code: String, host: &Identity, card_count: usize) -> Self {
        let mut room = Self {
            core: RoomCore::new(code, &host.user_id),
            card_count,
            cards: Vec::new(),
            matched_count: 0,
            revealed_indices: Vec::new(),
            resolving: false,
            winners: Vec::new(),
        };
        room.seat_player(host);
        room
    }

    pub fn seat_player(&mut self, identity: &Identity) {
        self.core
            .players
            .insert(identity.user_id.clone(), MemoryPlayer::new(identity));
    }

    pub fn pair_count(&self) -> usize {
        self.card_count / 2
    }

    /// Host-only transition from the lobby into play: deals a fresh deck from
    /// the catalogue and resets every score.
    pub fn start(
        &mut self,
        actor: &str,
        card_count: Option<usize>,
        catalogue: &[Country],
    ) -> Result<(), ServiceError> {
        self.core.ensure_host(actor)?;
        if self.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }

        let card_count = card_count.unwrap_or(self.card_count);
        if !CARD_COUNT_CHOICES.contains(&card_count) || card_count / 2 > catalogue.len() {
            return Err(ServiceError::InvalidCardCount);
        }
        if self.core.players.is_empty() {
            return Err(ServiceError::NoPlayers);
        }

        self.card_count = card_count;
        self.cards = deal_deck(catalogue, card_count / 2);
        self.matched_count = 0;
        self.revealed_indices.clear();
        self.resolving = false;
        self.winners.clear();
        for player in self.core.players.values_mut() {
            player.score = 0;
        }

        self.core.status = RoomStatus::Playing;
        let order: Vec<String> = self.core.players.keys().cloned().collect();
        self.core.turns.seed(order);

        Ok(())
    }

    /// Turn one card face up for the player holding the turn.
    pub fn pick(&mut self, actor: &str, index: usize) -> Result<PickOutcome, ServiceError> {
        self.core.ensure_playing()?;
        self.core.ensure_turn(actor)?;
        if self.resolving {
            return Err(ServiceError::Resolving);
        }
        if index >= self.cards.len() {
            return Err(ServiceError::InvalidIndex);
        }
        if self.cards[index].matched {
            return Err(ServiceError::AlreadyMatched);
        }
        if self.revealed_indices.contains(&index) {
            return Err(ServiceError::AlreadyRevealed);
        }

        self.revealed_indices.push(index);
        if self.revealed_indices.len() < 2 {
            return Ok(PickOutcome::Revealed);
        }

        let first = self.revealed_indices[0];
        let second = self.revealed_indices[1];
        if self.cards[first].country_key == self.cards[second].country_key {
            self.cards[first].matched = true;
            self.cards[second].matched = true;
            self.matched_count += 1;
            self.revealed_indices.clear();
            if let Some(player) = self.core.players.get_mut(actor) {
                player.score += 1;
            }

            let ended = self.matched_count == self.pair_count();
            if ended {
                self.winners = self.top_scorers();
                self.core.finish();
            }
            return Ok(PickOutcome::Matched { ended });
        }

        self.resolving = true;
        Ok(PickOutcome::Mismatch)
    }

    /// Flip a mismatched pair back and pass the turn. Run by the deferred
    /// task after it has re-checked status and timer identity.
    pub fn resolve_mismatch(&mut self) {
        self.revealed_indices.clear();
        self.resolving = false;
        self.core.turns.advance();
    }

    /// Every player tied for the highest score.
    fn top_scorers(&self) -> Vec<MemoryWinner> {
        let top = self
            .core
            .players
            .values()
            .map(|p| p.score)
            .max()
            .unwrap_or(0);
        self.core
            .players
            .values()
            .filter(|p| p.score == top)
            .map(|p| MemoryWinner {
                user_id: p.user_id.clone(),
                username: p.username.clone(),
                score: p.score,
            })
            .collect()
    }

    /// A card is face up iff it is part of the current attempt or already
    /// matched.
    pub fn is_card_visible(&self, index: usize) -> bool {
        self.cards
            .get(index)
            .map(|card| card.matched || self.revealed_indices.contains(&index))
            .unwrap_or(false)
    }
}

impl GameRoom for MemoryRoom {
    type Player = MemoryPlayer;

    fn core(&self) -> &RoomCore<MemoryPlayer> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore<MemoryPlayer> {
        &mut self.core
    }

    fn state_event(&self) -> serde_json::Result<ServerEvent> {
        ServerEvent::state(&MemorySnapshot::from(self))
    }
}

/// Pick `pairs` distinct countries, duplicate each, and shuffle the deck.
fn deal_deck(catalogue: &[Country], pairs: usize) -> Vec<MemoryCard> {
    let mut rng = rand::rng();

    let mut pool: Vec<&Country> = catalogue.iter().collect();
    pool.shuffle(&mut rng);
    pool.truncate(pairs);

    let mut deck: Vec<MemoryCard> = pool
        .into_iter()
        .flat_map(|country| {
            (0..2).map(move |_| MemoryCard {
                uid: Uuid::new_v4(),
                country_key: country.key.clone(),
                flag: country.flag.clone(),
                name_ko: country.name_ko.clone(),
                matched: false,
            })
        })
        .collect();
    deck.shuffle(&mut rng);
    deck
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn identity(id: &str) -> Identity {
        Identity {
            user_id: id.to_string(),
            username: id.to_string(),
        }
    }

    fn catalogue() -> Vec<Country> {
        (0..30)
            .map(|i| Country {
                key: format!("c{i}"),
                flag: "🏳".to_string(),
                name_ko: format!("나라{i}"),
            })
            .collect()
    }

    fn started_room() -> MemoryRoom {
        let mut room = MemoryRoom::new("AB23CD".into(), &identity("a"), 20);
        room.seat_player(&identity("b"));
        room.start("a", None, &catalogue()).unwrap();
        room
    }

    /// Indices of one matching pair and one mismatching pair in the deck.
    fn pair_and_mismatch(room: &MemoryRoom) -> ((usize, usize), (usize, usize)) {
        let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, card) in room.cards.iter().enumerate() {
            by_key.entry(card.country_key.as_str()).or_default().push(index);
        }

        let mut keys = by_key.values();
        let pair = keys.next().unwrap();
        let other = keys.next().unwrap();
        ((pair[0], pair[1]), (pair[0], other[0]))
    }

    #[test]
    fn deck_holds_every_key_exactly_twice() {
        let room = started_room();
        assert_eq!(room.cards.len(), 20);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for card in &room.cards {
            *counts.entry(card.country_key.as_str()).or_default() += 1;
        }
        assert_eq!(counts.len(), 10);
        assert!(counts.values().all(|&n| n == 2));
    }

    #[test]
    fn start_validates_card_count_and_host() {
        let mut room = MemoryRoom::new("AB23CD".into(), &identity("a"), 20);
        assert_eq!(
            room.start("b", None, &catalogue()).unwrap_err(),
            ServiceError::HostOnly
        );
        assert_eq!(
            room.start("a", Some(25), &catalogue()).unwrap_err(),
            ServiceError::InvalidCardCount
        );
        // A catalogue too small for the requested deck is rejected the same
        // way.
        assert_eq!(
            room.start("a", Some(60), &catalogue()[..20]).unwrap_err(),
            ServiceError::InvalidCardCount
        );

        room.start("a", Some(30), &catalogue()).unwrap();
        assert_eq!(room.cards.len(), 30);
        assert_eq!(room.core.status, RoomStatus::Playing);
    }

    #[test]
    fn first_reveal_keeps_the_attempt_open() {
        let mut room = started_room();
        let outcome = room.pick("a", 0).unwrap();
        assert_eq!(outcome, PickOutcome::Revealed);
        assert_eq!(room.revealed_indices, vec![0]);
        assert!(room.is_card_visible(0));
        assert!(!room.is_card_visible(1));
    }

    #[test]
    fn matching_pair_scores_and_retains_the_turn() {
        let mut room = started_room();
        let ((first, second), _) = pair_and_mismatch(&room);

        room.pick("a", first).unwrap();
        let outcome = room.pick("a", second).unwrap();
        assert_eq!(outcome, PickOutcome::Matched { ended: false });

        assert!(room.cards[first].matched);
        assert!(room.cards[second].matched);
        assert_eq!(room.matched_count, 1);
        assert!(room.revealed_indices.is_empty());
        assert_eq!(room.core.players["a"].score, 1);
        assert_eq!(room.core.turn_user_id(), Some("a"));
    }

    #[test]
    fn mismatch_sets_resolving_until_the_deferred_flip() {
        let mut room = started_room();
        let (_, (first, second)) = pair_and_mismatch(&room);

        room.pick("a", first).unwrap();
        let outcome = room.pick("a", second).unwrap();
        assert_eq!(outcome, PickOutcome::Mismatch);
        assert!(room.resolving);
        assert!(room.is_card_visible(first));
        assert!(room.is_card_visible(second));

        // Every further pick is rejected while the pair is face up.
        assert_eq!(room.pick("a", 5).unwrap_err(), ServiceError::Resolving);

        room.resolve_mismatch();
        assert!(!room.resolving);
        assert!(room.revealed_indices.is_empty());
        assert_eq!(room.core.turn_user_id(), Some("b"));
    }

    #[test]
    fn pick_validates_index_and_card_state() {
        let mut room = started_room();
        assert_eq!(room.pick("b", 0).unwrap_err(), ServiceError::NotYourTurn);
        assert_eq!(room.pick("a", 20).unwrap_err(), ServiceError::InvalidIndex);

        room.pick("a", 0).unwrap();
        assert_eq!(room.pick("a", 0).unwrap_err(), ServiceError::AlreadyRevealed);

        let mut fresh = started_room();
        let ((first, second), _) = pair_and_mismatch(&fresh);
        fresh.pick("a", first).unwrap();
        fresh.pick("a", second).unwrap();
        assert_eq!(
            fresh.pick("a", first).unwrap_err(),
            ServiceError::AlreadyMatched
        );
    }

    #[test]
    fn clearing_the_deck_ends_with_top_scorers() {
        let mut room = started_room();

        // Resolve the whole deck by always picking known pairs with the
        // current turn holder.
        while room.core.status == RoomStatus::Playing {
            let actor = room.core.turn_user_id().unwrap().to_string();
            let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
            for (index, card) in room.cards.iter().enumerate() {
                if !card.matched {
                    by_key.entry(card.country_key.clone()).or_default().push(index);
                }
            }
            let pair = by_key.values().next().unwrap().clone();
            room.pick(&actor, pair[0]).unwrap();
            room.pick(&actor, pair[1]).unwrap();
        }

        assert_eq!(room.matched_count, room.pair_count());
        assert_eq!(room.core.status, RoomStatus::Ended);
        assert!(!room.winners.is_empty());
        // Since "a" held the turn throughout and matches retain it, "a" swept
        // the deck.
        assert_eq!(room.winners[0].user_id, "a");
        assert_eq!(room.winners[0].score, room.pair_count() as u32);
    }
}
