use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::{
        bingo::{CreateBingoRequest, DrawRequest, DrawResponse, JoinBingoResponse,
            StartBingoRequest},
        common::{Ack, CreatedResponse},
    },
    error::AppError,
    identity::Identity,
    routes::extract::AppJson,
    services::bingo_service,
    state::SharedState,
};

/// Routes handling Bingo room operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create/bingo", post(create_room))
        .route("/bingo/{code}/join", post(join))
        .route("/bingo/{code}/leave", post(leave))
        .route("/bingo/{code}/start", post(start))
        .route("/bingo/{code}/draw", post(draw))
}

#[utoipa::path(
    post,
    path = "/create/bingo",
    tag = "bingo",
    request_body = CreateBingoRequest,
    responses((status = 200, description = "Room created", body = CreatedResponse))
)]
/// Open a new Bingo room and return its code.
pub async fn create_room(
    State(state): State<SharedState>,
    identity: Identity,
    AppJson(payload): AppJson<CreateBingoRequest>,
) -> Result<Json<CreatedResponse>, AppError> {
    let response = bingo_service::create_room(&state, &identity, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/bingo/{code}/join",
    tag = "bingo",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Joined", body = JoinBingoResponse))
)]
/// Join a Bingo room (idempotent for existing members).
pub async fn join(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<JoinBingoResponse>, AppError> {
    let response = bingo_service::join(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/bingo/{code}/leave",
    tag = "bingo",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Left", body = Ack))
)]
/// Leave a Bingo room.
pub async fn leave(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<Ack>, AppError> {
    let response = bingo_service::leave(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/bingo/{code}/start",
    tag = "bingo",
    params(("code" = String, Path, description = "Room code")),
    request_body = StartBingoRequest,
    responses((status = 200, description = "Started", body = Ack))
)]
/// Start the game (host only).
pub async fn start(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<StartBingoRequest>,
) -> Result<Json<Ack>, AppError> {
    let response = bingo_service::start(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/bingo/{code}/draw",
    tag = "bingo",
    params(("code" = String, Path, description = "Room code")),
    request_body = DrawRequest,
    responses((status = 200, description = "Number called", body = DrawResponse))
)]
/// Call a number with the turn.
pub async fn draw(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<DrawRequest>,
) -> Result<Json<DrawResponse>, AppError> {
    let response = bingo_service::draw(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}
