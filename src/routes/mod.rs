use axum::{Router, extract::DefaultBodyLimit};

use crate::state::SharedState;

pub mod bingo;
pub mod croc;
pub mod docs;
mod extract;
pub mod gomoku;
pub mod health;
pub mod memory;
pub mod stream;

/// Request bodies are tiny JSON objects; anything bigger is rejected with
/// `body_too_large` before any room lock is taken.
const BODY_LIMIT_BYTES: usize = 32 * 1024;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(stream::router())
        .merge(bingo::router())
        .merge(croc::router())
        .merge(memory::router())
        .merge(gomoku::router())
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
