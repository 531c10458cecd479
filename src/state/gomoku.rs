use std::time::SystemTime;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{gomoku::GomokuSnapshot, sse::ServerEvent},
    error::ServiceError,
    identity::Identity,
    state::room::{GameRoom, RoomCore, RoomStatus, Seat},
};

pub const BOARD_SIZE: usize = 15;
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;
pub const WIN_LENGTH: usize = 5;

/// Rooms seat exactly two players.
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Stone {
    #[serde(rename = "B")]
    Black,
    #[serde(rename = "W")]
    White,
}

#[derive(Debug)]
pub struct GomokuPlayer {
    pub user_id: String,
    pub username: String,
    pub joined_at: SystemTime,
    pub online: bool,
    pub stone: Option<Stone>,
}

impl GomokuPlayer {
    fn new(identity: &Identity, stone: Option<Stone>) -> Self {
        Self {
            user_id: identity.user_id.clone(),
            username: identity.username.clone(),
            joined_at: SystemTime::now(),
            online: false,
            stone,
        }
    }
}

impl Seat for GomokuPlayer {
    fn online(&self) -> bool {
        self.online
    }
    fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GomokuWinner {
    pub user_id: String,
    pub username: String,
    pub stone: Stone,
}

#[derive(Debug, Clone, Copy)]
pub struct MoveOutcome {
    pub ended: bool,
    pub draw: bool,
}

#[derive(Debug)]
pub struct GomokuRoom {
    pub core: RoomCore<GomokuPlayer>,
    /// Row-major 15×15 grid.
    pub board: Vec<Option<Stone>>,
    pub winner: Option<GomokuWinner>,
    pub draw: bool,
    pub last_move_index: Option<usize>,
    pub last_move_by_user_id: Option<String>,
}

impl GomokuRoom {
    pub fn new(code: String, host: &Identity) -> Self {
        let mut room = Self {
            core: RoomCore::new(code, &host.user_id),
            board: vec![None; CELL_COUNT],
            winner: None,
            draw: false,
            last_move_index: None,
            last_move_by_user_id: None,
        };
        room.seat_player(host);
        room
    }

    /// Seat a player with a deterministic stone: white when black is taken,
    /// black otherwise.
    pub fn seat_player(&mut self, identity: &Identity) {
        let black_taken = self
            .core
            .players
            .values()
            .any(|p| p.stone == Some(Stone::Black));
        let stone = if black_taken {
            Stone::White
        } else {
            Stone::Black
        };
        self.core.players.insert(
            identity.user_id.clone(),
            GomokuPlayer::new(identity, Some(stone)),
        );
    }

    /// Host-only transition from the lobby into play. The first player in
    /// join order takes black and opens.
    pub fn start(&mut self, actor: &str) -> Result<(), ServiceError> {
        self.core.ensure_host(actor)?;
        if self.core.status != RoomStatus::Lobby {
            return Err(ServiceError::RoomNotJoinable);
        }
        if self.core.players.len() != MAX_PLAYERS {
            return Err(ServiceError::NeedTwoPlayers);
        }

        self.board = vec![None; CELL_COUNT];
        self.winner = None;
        self.draw = false;
        self.last_move_index = None;
        self.last_move_by_user_id = None;

        let order: Vec<String> = self.core.players.keys().cloned().collect();
        for (position, id) in order.iter().enumerate() {
            if let Some(player) = self.core.players.get_mut(id) {
                player.stone = Some(if position == 0 {
                    Stone::Black
                } else {
                    Stone::White
                });
            }
        }
        self.core.turns.seed(order);
        self.core.status = RoomStatus::Playing;

        Ok(())
    }

    /// Place a stone for the player holding the turn.
    pub fn place(&mut self, actor: &str, index: usize) -> Result<MoveOutcome, ServiceError> {
        self.core.ensure_playing()?;
        self.core.ensure_turn(actor)?;

        let stone = self
            .core
            .players
            .get(actor)
            .and_then(|p| p.stone)
            .ok_or(ServiceError::PlayerNotReady)?;

        if index >= CELL_COUNT {
            return Err(ServiceError::InvalidIndex);
        }
        if self.board[index].is_some() {
            return Err(ServiceError::Occupied);
        }

        self.board[index] = Some(stone);
        self.last_move_index = Some(index);
        self.last_move_by_user_id = Some(actor.to_string());

        if wins_from(&self.board, index, stone) {
            self.winner = self.core.players.get(actor).map(|p| GomokuWinner {
                user_id: p.user_id.clone(),
                username: p.username.clone(),
                stone,
            });
            self.core.finish();
            return Ok(MoveOutcome {
                ended: true,
                draw: false,
            });
        }

        if self.board.iter().all(Option::is_some) {
            self.draw = true;
            self.core.finish();
            return Ok(MoveOutcome {
                ended: true,
                draw: true,
            });
        }

        self.core.turns.advance();
        Ok(MoveOutcome {
            ended: false,
            draw: false,
        })
    }

    /// Declare the only remaining player the winner (opponent forfeited by
    /// leaving mid-game).
    pub fn declare_forfeit_winner(&mut self) {
        self.winner = self
            .core
            .players
            .values()
            .next()
            .and_then(|p| p.stone.map(|stone| GomokuWinner {
                user_id: p.user_id.clone(),
                username: p.username.clone(),
                stone,
            }));
        self.core.finish();
    }
}

impl GameRoom for GomokuRoom {
    type Player = GomokuPlayer;

    fn core(&self) -> &RoomCore<GomokuPlayer> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RoomCore<GomokuPlayer> {
        &mut self.core
    }

    fn state_event(&self) -> serde_json::Result<ServerEvent> {
        ServerEvent::state(&GomokuSnapshot::from(self))
    }
}

/// Walk the four axes through `index` in both directions; five or more
/// contiguous same-color stones (including the one just placed) wins.
fn wins_from(board: &[Option<Stone>], index: usize, stone: Stone) -> bool {
    let row = (index / BOARD_SIZE) as isize;
    let col = (index % BOARD_SIZE) as isize;

    const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

    AXES.iter().any(|&(dr, dc)| {
        let run = 1 + count_dir(board, row, col, dr, dc, stone)
            + count_dir(board, row, col, -dr, -dc, stone);
        run >= WIN_LENGTH
    })
}

fn count_dir(
    board: &[Option<Stone>],
    row: isize,
    col: isize,
    dr: isize,
    dc: isize,
    stone: Stone,
) -> usize {
    let mut run = 0;
    let (mut r, mut c) = (row + dr, col + dc);
    let size = BOARD_SIZE as isize;

    while (0..size).contains(&r) && (0..size).contains(&c) {
        if board[(r * size + c) as usize] != Some(stone) {
            break;
        }
        run += 1;
        r += dr;
        c += dc;
    }

    run
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

    fn started_room() -> GomokuRoom {
        let mut room = GomokuRoom::new("AB23CD".into(), &identity("a"));
        room.seat_player(&identity("b"));
        room.start("a").unwrap();
        room
    }

    #[test]
    fn stones_are_assigned_deterministically() {
        let mut room = GomokuRoom::new("AB23CD".into(), &identity("a"));
        assert_eq!(room.core.players["a"].stone, Some(Stone::Black));

        room.seat_player(&identity("b"));
        assert_eq!(room.core.players["b"].stone, Some(Stone::White));
    }

    #[test]
    fn start_needs_the_host_and_exactly_two_players() {
        let mut room = GomokuRoom::new("AB23CD".into(), &identity("a"));
        assert_eq!(room.start("a").unwrap_err(), ServiceError::NeedTwoPlayers);

        room.seat_player(&identity("b"));
        assert_eq!(room.start("b").unwrap_err(), ServiceError::HostOnly);

        room.start("a").unwrap();
        assert_eq!(room.core.players["a"].stone, Some(Stone::Black));
        assert_eq!(room.core.players["b"].stone, Some(Stone::White));
        assert_eq!(room.core.turn_user_id(), Some("a"));
    }

    #[test]
    fn five_in_a_row_wins() {
        let mut room = started_room();

        // Black walks a horizontal row while white fills a distant corner.
        let black_moves = [112, 113, 114, 115, 116];
        let white_moves = [0, 1, 2, 3];

        for (i, &black) in black_moves.iter().enumerate() {
            let outcome = room.place("a", black).unwrap();
            if i < white_moves.len() {
                assert!(!outcome.ended);
                room.place("b", white_moves[i]).unwrap();
            } else {
                assert!(outcome.ended);
                assert!(!outcome.draw);
            }
        }

        let winner = room.winner.as_ref().unwrap();
        assert_eq!(winner.user_id, "a");
        assert_eq!(winner.stone, Stone::Black);
        assert_eq!(room.core.status, RoomStatus::Ended);
        assert_eq!(room.place("b", 50).unwrap_err(), ServiceError::NotPlaying);
    }

    #[test]
    fn vertical_and_diagonal_runs_win_too() {
        for step in [BOARD_SIZE, BOARD_SIZE + 1, BOARD_SIZE - 1] {
            let mut room = started_room();
            let start = 2 * BOARD_SIZE + 7;
            for i in 0..WIN_LENGTH {
                let outcome = room.place("a", start + i * step).unwrap();
                if i < WIN_LENGTH - 1 {
                    room.place("b", 210 + i).unwrap();
                } else {
                    assert!(outcome.ended, "step {step} should have won");
                }
            }
        }
    }

    #[test]
    fn move_validates_turn_cell_and_bounds() {
        let mut room = started_room();

        assert_eq!(room.place("b", 0).unwrap_err(), ServiceError::NotYourTurn);
        assert_eq!(
            room.place("a", CELL_COUNT).unwrap_err(),
            ServiceError::InvalidIndex
        );

        room.place("a", 7).unwrap();
        assert_eq!(room.place("b", 7).unwrap_err(), ServiceError::Occupied);
    }

    #[test]
    fn full_board_without_a_run_is_a_draw() {
        let mut room = started_room();

        // Period-four tiling with no five-in-a-row on any axis; leave one
        // black cell open for the final move.
        let open = 14 * BOARD_SIZE + 13;
        for index in 0..CELL_COUNT {
            if index == open {
                continue;
            }
            let (r, c) = (index / BOARD_SIZE, index % BOARD_SIZE);
            room.board[index] = Some(if (c / 2 + r) % 2 == 0 {
                Stone::Black
            } else {
                Stone::White
            });
        }

        let outcome = room.place("a", open).unwrap();
        assert!(outcome.ended);
        assert!(outcome.draw);
        assert!(room.draw);
        assert!(room.winner.is_none());
    }

    #[test]
    fn forfeit_hands_the_win_to_the_survivor() {
        let mut room = started_room();
        room.place("a", 7).unwrap();

        room.core.remove_player("a");
        room.core.turns.remove("a");
        room.declare_forfeit_winner();

        assert_eq!(room.core.status, RoomStatus::Ended);
        assert_eq!(room.winner.as_ref().unwrap().user_id, "b");
    }
}
