use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok"; the server has no external dependencies to degrade on.
    pub status: String,
    /// Open rooms per game kind.
    pub rooms: RoomCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomCounts {
    pub bingo: usize,
    pub croc: usize,
    pub memory: usize,
    pub gomoku: usize,
}
