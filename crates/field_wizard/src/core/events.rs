/*!
Change notifications for the rendering layer.

The store and the session publish a `SessionEvent` for every observable
change; renderers subscribe through `FormSession::subscribe` and re-read
whatever they display. Delivery is best-effort: sending never fails an
operation, and a receiver that falls behind sees `RecvError::Lagged`.
*/

use tokio::sync::broadcast;

use crate::form::{Attribute, FieldId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// All state was discarded and rebuilt from new definitions.
    Rebuilt { fields: usize },
    /// The active field pointer moved.
    Activated {
        id: FieldId,
        previous: Option<FieldId>,
    },
    /// An attribute observable under `id` changed.
    AttributeChanged { id: FieldId, attribute: Attribute },
}

/// Sending half shared by the store and the session.
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // No receivers is not an error.
        let _ = self.tx.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn sender(&self) -> broadcast::Sender<SessionEvent> {
        self.tx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_receivers_is_silent() {
        let sink = EventSink::new(0);
        sink.emit(SessionEvent::Rebuilt { fields: 0 });
    }

    #[test]
    fn subscribers_receive_events_in_order() {
        let sink = EventSink::new(4);
        let mut rx = sink.subscribe();
        sink.emit(SessionEvent::Rebuilt { fields: 2 });
        sink.emit(SessionEvent::AttributeChanged {
            id: "a".into(),
            attribute: Attribute::FormValue,
        });
        assert_eq!(rx.try_recv().unwrap(), SessionEvent::Rebuilt { fields: 2 });
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::AttributeChanged { attribute: Attribute::FormValue, .. }
        ));
    }
}
