use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        gomoku::{JoinGomokuResponse, PlaceStoneRequest, PlaceStoneResponse},
    },
    error::AppError,
    identity::Identity,
    routes::extract::AppJson,
    services::gomoku_service,
    state::SharedState,
};

/// Routes handling Gomoku room operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create/gomoku", post(create_room))
        .route("/gomoku/{code}/join", post(join))
        .route("/gomoku/{code}/leave", post(leave))
        .route("/gomoku/{code}/start", post(start))
        .route("/gomoku/{code}/move", post(place))
}

#[utoipa::path(
    post,
    path = "/create/gomoku",
    tag = "gomoku",
    responses((status = 200, description = "Room created", body = CreatedResponse))
)]
/// Open a new Gomoku room and return its code.
pub async fn create_room(
    State(state): State<SharedState>,
    identity: Identity,
) -> Result<Json<CreatedResponse>, AppError> {
    let response = gomoku_service::create_room(&state, &identity).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/gomoku/{code}/join",
    tag = "gomoku",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Joined", body = JoinGomokuResponse))
)]
/// Join a Gomoku room (idempotent for existing members).
pub async fn join(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<JoinGomokuResponse>, AppError> {
    let response = gomoku_service::join(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/gomoku/{code}/leave",
    tag = "gomoku",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Left", body = Ack))
)]
/// Leave a Gomoku room; leaving mid-game forfeits.
pub async fn leave(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<Ack>, AppError> {
    let response = gomoku_service::leave(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/gomoku/{code}/start",
    tag = "gomoku",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Started", body = Ack))
)]
/// Start the game (host only); black opens.
pub async fn start(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<Ack>, AppError> {
    let response = gomoku_service::start(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/gomoku/{code}/move",
    tag = "gomoku",
    params(("code" = String, Path, description = "Room code")),
    request_body = PlaceStoneRequest,
    responses((status = 200, description = "Stone placed", body = PlaceStoneResponse))
)]
/// Place a stone with the turn.
pub async fn place(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<PlaceStoneRequest>,
) -> Result<Json<PlaceStoneResponse>, AppError> {
    let response = gomoku_service::place(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}
