use crate::{
    dto::health::{HealthResponse, RoomCounts},
    state::SharedState,
};

/// Respond with the liveness payload and the current room counts.
pub fn health_status(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        rooms: RoomCounts {
            bingo: state.bingo().len(),
            croc: state.croc().len(),
            memory: state.memory().len(),
            gomoku: state.gomoku().len(),
        },
    }
}
