use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};

use crate::{
    dto::{
        common::{Ack, CreatedResponse},
        croc::{CreateCrocRequest, JoinCrocResponse, PickToothRequest, PickToothResponse,
            StartCrocRequest},
    },
    error::AppError,
    identity::Identity,
    routes::extract::AppJson,
    services::croc_service,
    state::SharedState,
};

/// Routes handling Crocodile Teeth room operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create/croc", post(create_room))
        .route("/croc/{code}/join", post(join))
        .route("/croc/{code}/leave", post(leave))
        .route("/croc/{code}/start", post(start))
        .route("/croc/{code}/pick", post(pick))
}

#[utoipa::path(
    post,
    path = "/create/croc",
    tag = "croc",
    request_body = CreateCrocRequest,
    responses((status = 200, description = "Room created", body = CreatedResponse))
)]
/// Open a new Crocodile Teeth room and return its code.
pub async fn create_room(
    State(state): State<SharedState>,
    identity: Identity,
    AppJson(payload): AppJson<CreateCrocRequest>,
) -> Result<Json<CreatedResponse>, AppError> {
    let response = croc_service::create_room(&state, &identity, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/croc/{code}/join",
    tag = "croc",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Joined", body = JoinCrocResponse))
)]
/// Join a Crocodile Teeth room (idempotent for existing members).
pub async fn join(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<JoinCrocResponse>, AppError> {
    let response = croc_service::join(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/croc/{code}/leave",
    tag = "croc",
    params(("code" = String, Path, description = "Room code")),
    responses((status = 200, description = "Left", body = Ack))
)]
/// Leave a Crocodile Teeth room.
pub async fn leave(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<Ack>, AppError> {
    let response = croc_service::leave(&state, &identity, &code).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/croc/{code}/start",
    tag = "croc",
    params(("code" = String, Path, description = "Room code")),
    request_body = StartCrocRequest,
    responses((status = 200, description = "Started", body = Ack))
)]
/// Start the game (host only).
pub async fn start(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<StartCrocRequest>,
) -> Result<Json<Ack>, AppError> {
    let response = croc_service::start(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/croc/{code}/pick",
    tag = "croc",
    params(("code" = String, Path, description = "Room code")),
    request_body = PickToothRequest,
    responses((status = 200, description = "Tooth picked", body = PickToothResponse))
)]
/// Pick a tooth with the turn.
pub async fn pick(
    State(state): State<SharedState>,
    identity: Identity,
    Path(code): Path<String>,
    AppJson(payload): AppJson<PickToothRequest>,
) -> Result<Json<PickToothResponse>, AppError> {
    let response = croc_service::pick(&state, &identity, &code, payload).await?;
    Ok(Json(response))
}
