//! Event fan-out to subscribers.

use crate::events::AuctionEvent;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast handle for auction events.
///
/// Cheap to clone. Emitting with zero subscribers is not an error; the
/// journal is the durable record, subscribers are a live view.
#[derive(Debug, Clone)]
pub struct EventNotifier {
    sender: broadcast::Sender<AuctionEvent>,
}

impl EventNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to all auction events from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub(crate) fn emit(&self, event: AuctionEvent) {
        trace!(
            event_id = %event.event_id(),
            auction_id = %event.auction_id(),
            kind = event.kind(),
            "Emitting auction event"
        );
        // A send error only means nobody is listening right now.
        let _ = self.sender.send(event);
    }
}
