use std::{
    collections::BTreeSet,
    time::{Duration, SystemTime},
};

use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{bingo::BingoSnapshot, sse::ServerEvent},
    error::ServiceError,
    identity::{BOT_USER_ID, Identity},
    state::room::{GameRoom, RoomCore, RoomStatus, Seat},
};

pub const MIN_SIZE: usize = 5;
pub const MAX_SIZE: usize = 10;

/// Lines (rows + columns + diagonals) required to win.
pub const TARGET_LINES: u32 = 5;

/// Legal values for the client-side draw timer hint.
pub const DRAW_TIMEOUT_CHOICES: [u32; 6] = [3, 5, 7, 10, 15, 20];

/// Delay before the bot plays once handed the turn.
pub const BOT_DRAW_DELAY: Duration = Duration::from_millis(1200);

/// How a number ended up being called. `timeout` exists on the wire for
/// clients but the server never auto-draws on human turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    ManualPick,
    BotPick,
    Timeout,
}

#[derive(Debug)]
pub struct BingoPlayer {
    pub user_id: String,
    pub username: String,
    pub joined_at: SystemTime,
    pub online: bool,
    pub is_bot: bool,
    /// Row-major `size × size` permutation of `1..=size²`.
    pub board: Vec<Vec<u16>>,
}

impl BingoPlayer {
    fn new(identity: &Identity, size: usize, is_bot: bool) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            joined_at: SystemTime::now(),
            online: false,
            is_bot,
            board: generate_board(size),
        }
    }
}

impl Seat for BingoPlayer {
    fn online(&self) -> bool {
        self.online
    }
    fn set_online(&mut self, online: bool) {
        self.online = online;
    }
    fn is_bot(&self) -> bool {
        self.is_bot
    }
}

/// Attribution of the most recent call.
#[derive(Debug, Clone)]
pub struct LastDraw {
    pub user_id: String,
    pub username: String,
    pub reason: DrawReason,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BingoWinner {
    pub user_id: String,
    pub username: String,
    pub lines: u32,
}

/// Result of a legal draw, telling the coordinator what to do next.
#[derive(Debug, Clone, Copy)]
pub struct DrawOutcome {
    pub number: u16,
    pub ended: bool,
    /// The turn just passed to the bot; the coordinator must arm the
    /// deferred draw.
    pub bot_turn_next: bool,
}

#[derive(Debug)]
pub struct BingoRoom {
    pub core: RoomCore<BingoPlayer>,
    pub size: usize,
    pub bot_enabled: bool,
    pub called: BTreeSet<u16>,
    pub last_number: Option<u16>,
    pub winners: Vec<BingoWinner>,
    pub draw_timeout_seconds: u32,
    /// Deadline of the armed bot draw; null on human turns, which have no
    /// server-side deadline.
    pub turn_ends_at: Option<SystemTime>,
    pub last_draw: Option<LastDraw>,
}

impl BingoRoom {
    /// Create the room with the host seated. The bot takes its seat right
    /// away when playing against the computer.
    pub fn new(code: String, host: &Identity, size: usize, bot_enabled: bool) -> Self {
        let mut room = Self {
            core: RoomCore::new(code, &host.user_id),
            size,
            bot_enabled,
            called: BTreeSet::new(),
            last_number: None,
            winners: Vec::new(),
            draw_timeout_seconds: DRAW_TIMEOUT_CHOICES[3],
            turn_ends_at: None,
            last_draw: None,
        };
        room.seat_player(host, false);
        room.sync_bot_seat();
        room
    }

    pub fn seat_player(&mut self, identity: &Identity, is_bot: bool) {
        self.core.players.insert(
            identity.user_id.clone(),
            BingoPlayer::new(identity, self.size, is_bot),
        );
    }

    /// Keep the bot seat consistent with the lobby roster: the bot occupies a
    /// slot while at most one human is present, and gives it up when a second
    /// human joins. During play the bot stays so the turn order is stable.
    pub fn sync_bot_seat(&mut self) {
        if self.core.status != RoomStatus::Lobby || !self.bot_enabled {
            return;
        }

        let humans = self.core.human_count();
        let bot_seated = self.core.is_member(BOT_USER_ID);

        if humans <= 1 && !bot_seated {
            self.seat_player(&Identity::bot(), true);
        } else if humans > 1 && bot_seated {
            self.core.remove_player(BOT_USER_ID);
        }
    }

    /// Host-only transition from the lobby into play.
    pub fn start(&mut self, actor: &str, draw_timeout_seconds: u32) -> Result<(), ServiceError> {
        self.core.ensure_host(actor)?;
        if self.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }
        if !DRAW_TIMEOUT_CHOICES.contains(&draw_timeout_seconds) {
            return Err(ServiceError::InvalidDrawTimeoutSeconds);
        }
        if self.core.players.len() < 2 {
            return Err(ServiceError::NeedTwoPlayers);
        }

        self.draw_timeout_seconds = draw_timeout_seconds;
        self.called.clear();
        self.last_number = None;
        self.last_draw = None;
        self.winners.clear();
        self.core.status = RoomStatus::Playing;
        let order: Vec<String> = self.core.players.keys().cloned().collect();
        self.core.turns.seed(order);
        self.turn_ends_at = None;

        Ok(())
    }

    /// Apply one call. Validation, winner evaluation, and turn handover all
    /// happen here; arming the bot timer is the coordinator's job.
    pub fn draw(
        &mut self,
        actor: &str,
        reason: DrawReason,
        number: u16,
    ) -> Result<DrawOutcome, ServiceError> {
        self.core.ensure_playing()?;
        self.core.ensure_member(actor)?;
        self.core.ensure_turn(actor)?;

        let ceiling = (self.size * self.size) as u16;
        if number < 1 || number > ceiling {
            return Err(ServiceError::InvalidNumber);
        }
        if self.called.contains(&number) {
            return Err(ServiceError::NumberAlreadyCalled);
        }

        self.called.insert(number);
        self.last_number = Some(number);
        self.last_draw = self.core.players.get(actor).map(|player| LastDraw {
            user_id: player.user_id.clone(),
            username: player.username.clone(),
            reason,
        });

        let winners = self.evaluate_winners();
        if !winners.is_empty() {
            self.winners = winners;
            self.core.finish();
            self.core.turns.clear();
            self.turn_ends_at = None;
            return Ok(DrawOutcome {
                number,
                ended: true,
                bot_turn_next: false,
            });
        }

        if self.called.len() == usize::from(ceiling) {
            // Deck exhausted with nobody at the threshold: game over, no
            // winners.
            self.core.finish();
            self.core.turns.clear();
            self.turn_ends_at = None;
            return Ok(DrawOutcome {
                number,
                ended: true,
                bot_turn_next: false,
            });
        }

        self.core.turns.advance();
        let bot_turn_next = self.core.turns.current() == Some(BOT_USER_ID);
        self.turn_ends_at = bot_turn_next.then(|| SystemTime::now() + BOT_DRAW_DELAY);

        Ok(DrawOutcome {
            number,
            ended: false,
            bot_turn_next,
        })
    }

    /// Every player currently at or above the line threshold.
    fn evaluate_winners(&self) -> Vec<BingoWinner> {
        self.core
            .players
            .values()
            .filter_map(|player| {
                let lines = line_count(&player.board, &self.called);
                (lines >= TARGET_LINES).then(|| BingoWinner {
                    user_id: player.user_id.clone(),
                    username: player.username.clone(),
                    lines,
                })
            })
            .collect()
    }

    /// A uniformly random number that has not been called yet.
    pub fn random_remaining(&self) -> Option<u16> {
        let ceiling = (self.size * self.size) as u16;
        let remaining: Vec<u16> = (1..=ceiling)
            .filter(|n| !self.called.contains(n))
            .collect();
        let mut rng = rand::rng();
        remaining.choose(&mut rng).copied()
    }
}

impl GameRoom for BingoRoom {
    type Player = BingoPlayer;

    fn core(&self) -> &RoomCore<BingoPlayer> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore<BingoPlayer> {
        &mut self.core
    }

    fn state_event(&self) -> serde_json::Result<ServerEvent> {
        ServerEvent::state(&BingoSnapshot::from(self))
    }
}

/// Shuffle `1..=size²` and reshape row-major.
fn generate_board(size: usize) -> Vec<Vec<u16>> {
    let mut numbers: Vec<u16> = (1..=(size * size) as u16).collect();
    let mut rng = rand::rng();
    numbers.shuffle(&mut rng);

    numbers.chunks(size).map(<[u16]>::to_vec).collect()
}

/// Complete rows + complete columns + both main diagonals whose cells have
/// all been called.
pub fn line_count(board: &[Vec<u16>], called: &BTreeSet<u16>) -> u32 {
    let size = board.len();
    let mut lines = 0;

    for row in board {
        if row.iter().all(|n| called.contains(n)) {
            lines += 1;
        }
    }

    for col in 0..size {
        if board.iter().all(|row| called.contains(&row[col])) {
            lines += 1;
        }
    }

    if (0..size).all(|i| called.contains(&board[i][i])) {
        lines += 1;
    }
    if (0..size).all(|i| called.contains(&board[i][size - 1 - i])) {
        lines += 1;
    }

    lines
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

    fn solo_room() -> BingoRoom {
        BingoRoom::new("AB23CD".into(), &identity("host"), 5, true)
    }

    fn two_human_room() -> BingoRoom {
        let mut room = BingoRoom::new("AB23CD".into(), &identity("host"), 5, false);
        room.seat_player(&identity("guest"), false);
        room.start("host", 10).unwrap();
        room
    }

    #[test]
    fn boards_are_permutations() {
        for size in MIN_SIZE..=MAX_SIZE {
            let board = generate_board(size);
            assert_eq!(board.len(), size);
            let mut flat: Vec<u16> = board.iter().flatten().copied().collect();
            flat.sort_unstable();
            let expected: Vec<u16> = (1..=(size * size) as u16).collect();
            assert_eq!(flat, expected);
        }
    }

    #[test]
    fn line_count_sees_rows_columns_and_diagonals() {
        let board: Vec<Vec<u16>> = (0..5)
            .map(|r| (0..5).map(|c| (r * 5 + c + 1) as u16).collect())
            .collect();

        // First row.
        let called: BTreeSet<u16> = [1, 2, 3, 4, 5].into();
        assert_eq!(line_count(&board, &called), 1);

        // First column.
        let called: BTreeSet<u16> = [1, 6, 11, 16, 21].into();
        assert_eq!(line_count(&board, &called), 1);

        // Main diagonal.
        let called: BTreeSet<u16> = [1, 7, 13, 19, 25].into();
        assert_eq!(line_count(&board, &called), 1);

        // Anti-diagonal.
        let called: BTreeSet<u16> = [5, 9, 13, 17, 21].into();
        assert_eq!(line_count(&board, &called), 1);

        // Everything called: 5 rows + 5 columns + 2 diagonals.
        let called: BTreeSet<u16> = (1..=25).collect();
        assert_eq!(line_count(&board, &called), 12);
    }

    #[test]
    fn bot_takes_and_gives_up_its_seat_in_the_lobby() {
        let mut room = solo_room();
        assert!(room.core.is_member(BOT_USER_ID));
        assert_eq!(room.core.players.len(), 2);

        room.seat_player(&identity("guest"), false);
        room.sync_bot_seat();
        assert!(!room.core.is_member(BOT_USER_ID));

        room.core.remove_player("guest");
        room.sync_bot_seat();
        assert!(room.core.is_member(BOT_USER_ID));
    }

    #[test]
    fn start_validates_host_timeout_and_roster() {
        let mut room = solo_room();
        assert_eq!(
            room.start("guest", 10).unwrap_err(),
            ServiceError::HostOnly
        );
        assert_eq!(
            room.start("host", 4).unwrap_err(),
            ServiceError::InvalidDrawTimeoutSeconds
        );

        room.start("host", 10).unwrap();
        assert_eq!(room.core.status, RoomStatus::Playing);
        assert_eq!(room.core.turns.order(), ["host", BOT_USER_ID]);

        assert_eq!(
            room.start("host", 10).unwrap_err(),
            ServiceError::RoomNotJoinable
        );
    }

    #[test]
    fn draw_validates_turn_and_number() {
        let mut room = two_human_room();

        assert_eq!(
            room.draw("guest", DrawReason::ManualPick, 7).unwrap_err(),
            ServiceError::NotYourTurn
        );
        assert_eq!(
            room.draw("host", DrawReason::ManualPick, 0).unwrap_err(),
            ServiceError::InvalidNumber
        );
        assert_eq!(
            room.draw("host", DrawReason::ManualPick, 26).unwrap_err(),
            ServiceError::InvalidNumber
        );

        let outcome = room.draw("host", DrawReason::ManualPick, 7).unwrap();
        assert_eq!(outcome.number, 7);
        assert!(!outcome.ended);
        assert_eq!(room.core.turn_user_id(), Some("guest"));

        assert_eq!(
            room.draw("guest", DrawReason::ManualPick, 7).unwrap_err(),
            ServiceError::NumberAlreadyCalled
        );
    }

    #[test]
    fn bot_handover_is_reported_to_the_coordinator() {
        let mut room = solo_room();
        room.start("host", 10).unwrap();

        let outcome = room.draw("host", DrawReason::ManualPick, 7).unwrap();
        assert!(outcome.bot_turn_next);
        assert!(room.turn_ends_at.is_some());
        assert_eq!(room.core.turn_user_id(), Some(BOT_USER_ID));

        let pick = room.random_remaining().unwrap();
        assert_ne!(pick, 7);
        let outcome = room.draw(BOT_USER_ID, DrawReason::BotPick, pick).unwrap();
        assert!(!outcome.bot_turn_next);
        assert!(room.turn_ends_at.is_none());
        assert_eq!(room.core.turn_user_id(), Some("host"));
    }

    #[test]
    fn completing_five_lines_ends_the_game() {
        let mut room = two_human_room();

        // Call everything except the last number of the host's board; with a
        // full board minus one cell the host is far past the threshold once
        // it lands.
        let board = room.core.players["host"].board.clone();
        let flat: Vec<u16> = board.iter().flatten().copied().collect();
        let (last, rest) = flat.split_last().unwrap();

        let mut turn_holder_is_host = true;
        for n in rest {
            let actor = if turn_holder_is_host { "host" } else { "guest" };
            let outcome = room.draw(actor, DrawReason::ManualPick, *n).unwrap();
            if outcome.ended {
                break;
            }
            turn_holder_is_host = !turn_holder_is_host;
        }

        if room.core.status == RoomStatus::Playing {
            let actor = if turn_holder_is_host { "host" } else { "guest" };
            let outcome = room.draw(actor, DrawReason::ManualPick, *last).unwrap();
            assert!(outcome.ended);
        }

        assert_eq!(room.core.status, RoomStatus::Ended);
        assert!(!room.winners.is_empty());
        assert!(room.winners.iter().all(|w| w.lines >= TARGET_LINES));
        assert_eq!(
            room.draw("host", DrawReason::ManualPick, 1).unwrap_err(),
            ServiceError::NotPlaying
        );
    }

    #[test]
    fn winners_record_ties() {
        let mut room = two_human_room();
        // Give both players the same board so every line completes for both.
        let board = room.core.players["host"].board.clone();
        room.core.players.get_mut("guest").unwrap().board = board.clone();

        let flat: Vec<u16> = board.iter().flatten().copied().collect();
        let mut actors = ["host", "guest"].iter().cycle();
        for n in &flat {
            if room.core.status != RoomStatus::Playing {
                break;
            }
            let actor = actors.next().unwrap();
            room.draw(actor, DrawReason::ManualPick, *n).unwrap();
        }

        assert_eq!(room.core.status, RoomStatus::Ended);
        assert_eq!(room.winners.len(), 2);
    }
}
