use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Bingo room data structures.
pub mod bingo;
/// Common data structures shared across DTOs.
pub mod common;
/// Crocodile Teeth room data structures.
pub mod croc;
/// Gomoku room data structures.
pub mod gomoku;
/// Health check data structures.
pub mod health;
/// Flag Memory room data structures.
pub mod memory;
/// Server-Sent Events data structures.
pub mod sse;
/// Request validation utilities.
pub mod validation;

/// Formats a SystemTime as an RFC3339 timestamp string.
pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
