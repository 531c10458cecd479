use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Parlor Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::stream::bingo_stream,
        crate::routes::stream::croc_stream,
        crate::routes::stream::memory_stream,
        crate::routes::stream::gomoku_stream,
        crate::routes::bingo::create_room,
        crate::routes::bingo::join,
        crate::routes::bingo::leave,
        crate::routes::bingo::start,
        crate::routes::bingo::draw,
        crate::routes::croc::create_room,
        crate::routes::croc::join,
        crate::routes::croc::leave,
        crate::routes::croc::start,
        crate::routes::croc::pick,
        crate::routes::memory::create_room,
        crate::routes::memory::join,
        crate::routes::memory::leave,
        crate::routes::memory::start,
        crate::routes::memory::pick,
        crate::routes::gomoku::create_room,
        crate::routes::gomoku::join,
        crate::routes::gomoku::leave,
        crate::routes::gomoku::start,
        crate::routes::gomoku::place,
    ),
    components(
        schemas(
            crate::dto::common::Ack,
            crate::dto::common::CreatedResponse,
            crate::dto::health::HealthResponse,
            crate::dto::health::RoomCounts,
            crate::dto::bingo::CreateBingoRequest,
            crate::dto::bingo::StartBingoRequest,
            crate::dto::bingo::DrawRequest,
            crate::dto::bingo::DrawResponse,
            crate::dto::bingo::JoinBingoResponse,
            crate::dto::bingo::BingoSnapshot,
            crate::dto::bingo::BingoPlayerSnapshot,
            crate::dto::croc::CreateCrocRequest,
            crate::dto::croc::StartCrocRequest,
            crate::dto::croc::PickToothRequest,
            crate::dto::croc::PickToothResponse,
            crate::dto::croc::JoinCrocResponse,
            crate::dto::croc::CrocSnapshot,
            crate::dto::croc::CrocPlayerSnapshot,
            crate::dto::memory::CreateMemoryRequest,
            crate::dto::memory::StartMemoryRequest,
            crate::dto::memory::PickCardRequest,
            crate::dto::memory::PickCardResponse,
            crate::dto::memory::JoinMemoryResponse,
            crate::dto::memory::MemorySnapshot,
            crate::dto::memory::MemoryPlayerSnapshot,
            crate::dto::memory::MemoryCardSnapshot,
            crate::dto::gomoku::PlaceStoneRequest,
            crate::dto::gomoku::PlaceStoneResponse,
            crate::dto::gomoku::JoinGomokuResponse,
            crate::dto::gomoku::GomokuSnapshot,
            crate::dto::gomoku::GomokuPlayerSnapshot,
            crate::state::room::RoomStatus,
            crate::state::bingo::BingoWinner,
            crate::state::bingo::DrawReason,
            crate::state::croc::CrocPlayerRef,
            crate::state::memory::MemoryWinner,
            crate::state::gomoku::GomokuWinner,
            crate::state::gomoku::Stone,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "stream", description = "Server-sent events streams"),
        (name = "bingo", description = "Number-call Bingo rooms"),
        (name = "croc", description = "Crocodile Teeth trap-picking rooms"),
        (name = "memory", description = "Flag Memory matching rooms"),
        (name = "gomoku", description = "Gomoku rooms"),
    )
)]
pub struct ApiDoc;
