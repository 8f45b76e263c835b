use std::sync::atomic::{AtomicU64, Ordering};

/// Broker counters.
#[derive(Debug, Default)]
pub struct BrokerStats {
    /// Topics created.
    pub topics_created: AtomicU64,
    /// Successful `publish` calls (appends).
    pub published: AtomicU64,
    /// Publishes rejected for an unknown topic.
    pub publish_rejected: AtomicU64,
    /// Messages delivered to consumers.
    pub messages_delivered: AtomicU64,
    /// Delivery passes that ended with an error.
    pub delivery_failures: AtomicU64,
}

/// Point-in-time copy of [`BrokerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub topics_created: u64,
    pub published: u64,
    pub publish_rejected: u64,
    pub messages_delivered: u64,
    pub delivery_failures: u64,
}

impl BrokerStats {
    pub(crate) fn record_topic_created(&self) {
        self.topics_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish_rejected(&self) {
        self.publish_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(
        &self,
        count: usize,
    ) {
        self.messages_delivered
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery_failure(&self) {
        self.delivery_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            topics_created: self.topics_created.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            publish_rejected: self.publish_rejected.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
        }
    }
}
