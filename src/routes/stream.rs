use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{
    error::AppError,
    identity::Identity,
    services::stream_service,
    state::{AppState, SharedState},
};

/// Live snapshot streams, one endpoint per game kind.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stream/bingo/{code}", get(bingo_stream))
        .route("/stream/croc/{code}", get(croc_stream))
        .route("/stream/memory/{code}", get(memory_stream))
        .route("/stream/gomoku/{code}", get(gomoku_stream))
}

#[utoipa::path(
    get,
    path = "/stream/bingo/{code}",
    tag = "stream",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Bingo room event stream", content_type = "text/event-stream", body = String))
)]
/// Stream `state` events for a Bingo room to one of its players.
pub async fn bingo_stream(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(stream_service::subscribe(state, AppState::bingo, identity, &code).await?)
}

#[utoipa::path(
    get,
    path = "/stream/croc/{code}",
    tag = "stream",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Crocodile Teeth room event stream", content_type = "text/event-stream", body = String))
)]
/// Stream `state` events for a Crocodile Teeth room to one of its players.
pub async fn croc_stream(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(stream_service::subscribe(state, AppState::croc, identity, &code).await?)
}

#[utoipa::path(
    get,
    path = "/stream/memory/{code}",
    tag = "stream",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Flag Memory room event stream", content_type = "text/event-stream", body = String))
)]
/// Stream `state` events for a Flag Memory room to one of its players.
pub async fn memory_stream(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(stream_service::subscribe(state, AppState::memory, identity, &code).await?)
}

#[utoipa::path(
    get,
    path = "/stream/gomoku/{code}",
    tag = "stream",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Gomoku room event stream", content_type = "text/event-stream", body = String))
)]
/// Stream `state` events for a Gomoku room to one of its players.
pub async fn gomoku_stream(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    Ok(stream_service::subscribe(state, AppState::gomoku, identity, &code).await?)
}
