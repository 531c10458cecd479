use serde::Serialize;

/// Dispatched payload carried across a room's SSE channel.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    /// Event type name for the SSE message.
    pub event: String,
    /// The serialized JSON data for the event.
    pub data: String,
}

/// The only application event: a full public snapshot of the room.
pub const STATE_EVENT: &str = "state";

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<T>(event: &str, payload: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Ok(Self {
            event: event.to_string(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Build the `state` event from a snapshot, serialising it exactly once.
    pub fn state<T>(snapshot: &T) -> serde_json::Result<Self>
    where
        T: Serialize,
    {
        Self::json(STATE_EVENT, snapshot)
    }
}
