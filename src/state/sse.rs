use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Number of events a slow subscriber may fall behind before it starts
/// lagging. Snapshots are self-contained, so lagged receivers simply resume
/// with the next full state.
const CHANNEL_CAPACITY: usize = 16;

/// Per-room broadcast hub fanning snapshots out to every subscribed stream.
#[derive(Debug)]
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel.
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    /// A send error only means nobody is listening right now.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of live subscriber handles.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SseHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let hub = SseHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        hub.broadcast(ServerEvent {
            event: "state".into(),
            data: "{}".into(),
        });

        assert_eq!(a.recv().await.unwrap().data, "{}");
        assert_eq!(b.recv().await.unwrap().data, "{}");
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_a_noop() {
        let hub = SseHub::new();
        hub.broadcast(ServerEvent {
            event: "state".into(),
            data: "{}".into(),
        });
        assert_eq!(hub.subscriber_count(), 0);
    }
}
