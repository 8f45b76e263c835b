use super::ConsumerId;
use crate::{BrokerError, DeliveryError};

/// Result of one delivery pass to one consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerOutcome {
    pub consumer: ConsumerId,
    /// Messages delivered successfully during this pass.
    pub delivered: usize,
    /// Offset after the pass (next unread index).
    pub offset: usize,
    /// First delivery error, if the pass stopped early.
    pub error: Option<DeliveryError>,
}

impl ConsumerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-consumer results of a broadcast, in subscriber order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub topic: String,
    pub outcomes: Vec<ConsumerOutcome>,
}

impl BroadcastReport {
    pub fn new(
        topic: impl Into<String>,
        outcomes: Vec<ConsumerOutcome>,
    ) -> Self {
        Self {
            topic: topic.into(),
            outcomes,
        }
    }

    /// `true` iff every consumer succeeded. Vacuously `true` without
    /// subscribers.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(ConsumerOutcome::is_success)
    }

    pub fn outcome(
        &self,
        consumer: &ConsumerId,
    ) -> Option<&ConsumerOutcome> {
        self.outcomes.iter().find(|o| &o.consumer == consumer)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConsumerOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Total messages delivered across all consumers.
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().map(|o| o.delivered).sum()
    }
}

/// Outcome of publishing to one bound topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOutcome {
    pub topic: String,
    pub result: Result<BroadcastReport, BrokerError>,
}

impl TopicOutcome {
    pub fn is_success(&self) -> bool {
        matches!(&self.result, Ok(report) if report.is_success())
    }
}

/// Results of `Producer::produce`, one entry per bound topic, sorted by topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProduceReport {
    pub topics: Vec<TopicOutcome>,
}

impl ProduceReport {
    /// `true` iff every publish and every delivery succeeded. Vacuously `true`
    /// without bindings.
    pub fn is_success(&self) -> bool {
        self.topics.iter().all(TopicOutcome::is_success)
    }

    pub fn failed_topics(&self) -> Vec<&str> {
        self.topics
            .iter()
            .filter(|t| !t.is_success())
            .map(|t| t.topic.as_str())
            .collect()
    }

    pub fn topic(
        &self,
        topic: &str,
    ) -> Option<&TopicOutcome> {
        self.topics.iter().find(|t| t.topic == topic)
    }
}
