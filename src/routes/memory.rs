use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        memory::{CreateMemoryRequest, JoinMemoryResponse, PickCardRequest, PickCardResponse,
            StartMemoryRequest},
    },
    error::AppError,
    identity::Identity,
    routes::extract::AppJson,
    services::memory_service,
    state::SharedState,
};

/// Routes handling Flag Memory room operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create/memory", post(create_room))
        .route("/memory/{code}/join", post(join))
        .route("/memory/{code}/leave", post(leave))
        .route("/memory/{code}/start", post(start))
        .route("/memory/{code}/pick", post(pick))
}

#[utoipa::path(
    post,
    path = "/create/memory",
    tag = "memory",
    request_body = CreateMemoryRequest,
    responses((status = 200, description = "Room created", body = CreatedResponse))
)]
/// Open a new Flag Memory room and return its code.
pub async fn create_room(
    State(state): State<SharedState>,
    identity: Identity,
    AppJson(payload): AppJson<CreateMemoryRequest>,
) -> Result<Json<CreatedResponse>, AppError> {
    let response = memory_service::create_room(&state, &identity, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/memory/{code}/join",
    tag = "memory",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Joined", body = JoinMemoryResponse))
)]
/// Join a Flag Memory room (idempotent for existing members).
pub async fn join(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<JoinMemoryResponse>, AppError> {
    let response = memory_service::join(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/memory/{code}/leave",
    tag = "memory",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Left", body = Ack))
)]
/// Leave a Flag Memory room.
pub async fn leave(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<Ack>, AppError> {
    let response = memory_service::leave(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/memory/{code}/start",
    tag = "memory",
    params(("code" = String, Path, description = "Room code")),
    request_body = StartMemoryRequest,
    responses((status = 200, description = "Started", body = Ack))
)]
/// Start the game (host only).
pub async fn start(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<StartMemoryRequest>,
) -> Result<Json<Ack>, AppError> {
    let response = memory_service::start(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/memory/{code}/pick",
    tag = "memory",
    params(("code" = String, Path, description = "Room code")),
    request_body = PickCardRequest,
    responses((status = 200, description = "Card picked", body = PickCardResponse))
)]
/// Turn a card face up with the turn.
pub async fn pick(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<PickCardRequest>,
) -> Result<Json<PickCardResponse>, AppError> {
    let response = memory_service::pick(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}
