use serde::Serialize;
use utoipa::ToSchema;

/// Minimal success body for operations with no payload (`leave`, `start`).
#[derive(Debug, Serialize, ToSchema)]
pub struct Ack {
    pub ok: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Success body of every `create` operation: the freshly allocated room code.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub ok: bool,
    pub code: String,
}

impl CreatedResponse {
    pub fn new(code: String) -> Self {
        Self { ok: true, code }
    }
}
