pub mod bingo;
pub mod croc;
pub mod gomoku;
pub mod memory;
pub mod registry;
pub mod room;
mod sse;
pub mod turns;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    state::{
        bingo::BingoRoom, croc::CrocRoom, gomoku::GomokuRoom, memory::MemoryRoom,
        registry::RoomRegistry,
    },
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Central application state: one room registry per game kind plus the
/// immutable runtime configuration. Rooms own all mutable game state; nothing
/// is shared mutably between rooms.
pub struct AppState {
    config: AppConfig,
    bingo: RoomRegistry<BingoRoom>,
    croc: RoomRegistry<CrocRoom>,
    memory: RoomRegistry<MemoryRoom>,
    gomoku: RoomRegistry<GomokuRoom>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            bingo: RoomRegistry::new(),
            croc: RoomRegistry::new(),
            memory: RoomRegistry::new(),
            gomoku: RoomRegistry::new(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn bingo(&self) -> &RoomRegistry<BingoRoom> {
        &self.bingo
    }

    pub fn croc(&self) -> &RoomRegistry<CrocRoom> {
        &self.croc
    }

    pub fn memory(&self) -> &RoomRegistry<MemoryRoom> {
        &self.memory
    }

    pub fn gomoku(&self) -> &RoomRegistry<GomokuRoom> {
        &self.gomoku
    }
}
