/// Bingo room coordination.
pub mod bingo_service;
/// Crocodile Teeth room coordination.
pub mod croc_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Gomoku room coordination.
pub mod gomoku_service;
/// Health check service.
pub mod health_service;
/// Flag Memory room coordination.
pub mod memory_service;
/// Server-Sent Events streaming and presence bookkeeping.
pub mod stream_service;
