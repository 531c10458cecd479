use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

/// Domain errors raised by the room services. Every variant maps to one
/// stable identifier that clients match on, so variants are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request body is not valid JSON")]
    InvalidJson,
    #[error("request body exceeds the size limit")]
    BodyTooLarge,
    #[error("board size must be between 5 and 10")]
    InvalidSize,
    #[error("draw timeout must be one of 3, 5, 7, 10, 15 or 20 seconds")]
    InvalidDrawTimeoutSeconds,
    #[error("tooth is outside the jaw or not a valid tooth number")]
    InvalidTooth,
    #[error("tooth count per jaw must be between 8 and 20")]
    InvalidToothCountPerJaw,
    #[error("card count must be one of 20, 30, 40, 50 or 60")]
    InvalidCardCount,
    #[error("index is outside the board")]
    InvalidIndex,
    #[error("number is outside the board range")]
    InvalidNumber,
    #[error("username must be between 1 and 20 characters")]
    UsernameLength,
    #[error("authentication is required")]
    Unauthorized,
    #[error("only the host may perform this operation")]
    HostOnly,
    #[error("caller is not a player in this room")]
    NotInRoom,
    #[error("it is not the caller's turn")]
    NotYourTurn,
    #[error("the game is not in progress")]
    NotPlaying,
    #[error("the room is no longer accepting players")]
    RoomNotJoinable,
    #[error("the room is full")]
    RoomFull,
    #[error("at least two players are required")]
    NeedTwoPlayers,
    #[error("at least one player is required")]
    NoPlayers,
    #[error("that number has already been called")]
    NumberAlreadyCalled,
    #[error("that tooth has already been picked")]
    AlreadySelected,
    #[error("that card is already matched")]
    AlreadyMatched,
    #[error("that card is already face up")]
    AlreadyRevealed,
    #[error("a mismatch is still being resolved")]
    Resolving,
    #[error("that cell is occupied")]
    Occupied,
    #[error("both players must be seated before moving")]
    PlayerNotReady,
    #[error("room not found")]
    RoomNotFound,
    #[error("could not allocate a unique room code")]
    RoomCodeCollision,
}

impl ServiceError {
    /// Stable identifier carried in the `error` field of failure responses.
    pub fn id(&self) -> &'static str {
        match self {
            ServiceError::InvalidJson => "invalid_json",
            ServiceError::BodyTooLarge => "body_too_large",
            ServiceError::InvalidSize => "invalid_size",
            ServiceError::InvalidDrawTimeoutSeconds => "invalid_draw_timeout_seconds",
            ServiceError::InvalidTooth => "invalid_tooth",
            ServiceError::InvalidToothCountPerJaw => "invalid_tooth_count_per_jaw",
            ServiceError::InvalidCardCount => "invalid_card_count",
            ServiceError::InvalidIndex => "invalid_index",
            ServiceError::InvalidNumber => "invalid_number",
            ServiceError::UsernameLength => "username_length",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::HostOnly => "host_only",
            ServiceError::NotInRoom => "not_in_room",
            ServiceError::NotYourTurn => "not_your_turn",
            ServiceError::NotPlaying => "not_playing",
            ServiceError::RoomNotJoinable => "room_not_joinable",
            ServiceError::RoomFull => "room_full",
            ServiceError::NeedTwoPlayers => "need_two_players",
            ServiceError::NoPlayers => "no_players",
            ServiceError::NumberAlreadyCalled => "number_already_called",
            ServiceError::AlreadySelected => "already_selected",
            ServiceError::AlreadyMatched => "already_matched",
            ServiceError::AlreadyRevealed => "already_revealed",
            ServiceError::Resolving => "resolving",
            ServiceError::Occupied => "occupied",
            ServiceError::PlayerNotReady => "player_not_ready",
            ServiceError::RoomNotFound => "room_not_found",
            ServiceError::RoomCodeCollision => "room_code_collision",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidJson
            | ServiceError::InvalidSize
            | ServiceError::InvalidDrawTimeoutSeconds
            | ServiceError::InvalidTooth
            | ServiceError::InvalidToothCountPerJaw
            | ServiceError::InvalidCardCount
            | ServiceError::InvalidIndex
            | ServiceError::InvalidNumber
            | ServiceError::UsernameLength => StatusCode::BAD_REQUEST,
            ServiceError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
            ServiceError::HostOnly | ServiceError::NotInRoom | ServiceError::NotYourTurn => {
                StatusCode::FORBIDDEN
            }
            ServiceError::NotPlaying
            | ServiceError::RoomNotJoinable
            | ServiceError::RoomFull
            | ServiceError::NeedTwoPlayers
            | ServiceError::NoPlayers
            | ServiceError::NumberAlreadyCalled
            | ServiceError::AlreadySelected
            | ServiceError::AlreadyMatched
            | ServiceError::AlreadyRevealed
            | ServiceError::Resolving
            | ServiceError::Occupied
            | ServiceError::PlayerNotReady => StatusCode::CONFLICT,
            ServiceError::RoomNotFound => StatusCode::NOT_FOUND,
            ServiceError::RoomCodeCollision => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP-layer wrapper turning a [`ServiceError`] into the uniform
/// `{ok:false, error:<id>}` failure body.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct AppError(#[from] pub ServiceError);

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status();
        let payload = Json(ErrorBody {
            ok: false,
            error: self.0.id(),
        });

        (status, payload).into_response()
    }
}
