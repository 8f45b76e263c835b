use std::sync::Arc;

use tokio::sync::broadcast;

use super::ConsumerId;
use crate::{DeliveryError, RecvError, TryRecvError};

/// Observable points of the broker lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    TopicCreated {
        topic: Arc<str>,
    },
    ConsumerSubscribed {
        topic: Arc<str>,
        consumer: ConsumerId,
    },
    ConsumerUnsubscribed {
        topic: Arc<str>,
        consumer: ConsumerId,
    },
    MessagePublished {
        topic: Arc<str>,
        offset: usize,
    },
    /// A delivery pass that delivered at least one message without error.
    DeliverySucceeded {
        topic: Arc<str>,
        consumer: ConsumerId,
        delivered: usize,
        offset: usize,
    },
    DeliveryFailed {
        topic: Arc<str>,
        consumer: ConsumerId,
        offset: usize,
        error: DeliveryError,
    },
}

impl BrokerEvent {
    pub fn topic(&self) -> &str {
        match self {
            Self::TopicCreated { topic }
            | Self::ConsumerSubscribed { topic, .. }
            | Self::ConsumerUnsubscribed { topic, .. }
            | Self::MessagePublished { topic, .. }
            | Self::DeliverySucceeded { topic, .. }
            | Self::DeliveryFailed { topic, .. } => topic,
        }
    }
}

/// Sending side of the event stream. Events are dropped when nobody listens.
#[derive(Debug)]
pub(crate) struct EventBus {
    tx: broadcast::Sender<BrokerEvent>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub(crate) fn emit(
        &self,
        event: BrokerEvent,
    ) {
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(event);
        }
    }

    pub(crate) fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            inner: self.tx.subscribe(),
        }
    }
}

/// Receiving side of the broker event stream.
///
/// Sees only events emitted after it was created. A slow receiver loses the
/// oldest events and gets `RecvError::Lagged`.
pub struct EventSubscription {
    inner: broadcast::Receiver<BrokerEvent>,
}

impl EventSubscription {
    /// Waits for the next event.
    ///
    /// # Returns
    /// - `Err(RecvError::Closed)` once the broker is dropped
    /// - `Err(RecvError::Lagged(n))` if `n` events were overwritten
    pub async fn recv(&mut self) -> Result<BrokerEvent, RecvError> {
        self.inner.recv().await.map_err(Into::into)
    }

    pub fn try_recv(&mut self) -> Result<BrokerEvent, TryRecvError> {
        self.inner.try_recv().map_err(Into::into)
    }

    /// Drains every event currently queued.
    pub fn drain(&mut self) -> Vec<BrokerEvent> {
        let mut events = Vec::new();
        loop {
            match self.inner.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created(topic: &str) -> BrokerEvent {
        BrokerEvent::TopicCreated {
            topic: Arc::from(topic),
        }
    }

    #[tokio::test]
    async fn test_emit_and_recv() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();

        bus.emit(created("t"));
        let event = sub.recv().await.unwrap();
        assert_eq!(event, created("t"));
        assert_eq!(event.topic(), "t");
        assert_eq!(sub.try_recv(), Err(TryRecvError::Empty));
    }

    /// Emitting without receivers is a silent no-op.
    #[test]
    fn test_emit_without_receivers() {
        let bus = EventBus::new(8);
        bus.emit(created("t"));
        let mut sub = bus.subscribe();
        assert!(sub.is_empty());
        assert!(sub.drain().is_empty());
    }

    #[tokio::test]
    async fn test_lagged_receiver() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.emit(created(&format!("t{i}")));
        }
        assert_eq!(sub.recv().await, Err(RecvError::Lagged(3)));
        assert_eq!(sub.recv().await.unwrap().topic(), "t3");
    }

    #[tokio::test]
    async fn test_closed_after_bus_dropped() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();
        drop(bus);
        assert_eq!(sub.recv().await, Err(RecvError::Closed));
    }

    #[test]
    fn test_drain() {
        let bus = EventBus::new(8);
        let mut sub = bus.subscribe();
        bus.emit(created("a"));
        bus.emit(created("b"));
        assert_eq!(sub.len(), 2);
        let topics: Vec<_> = sub.drain().iter().map(|e| e.topic().to_string()).collect();
        assert_eq!(topics, vec!["a", "b"]);
    }
}
