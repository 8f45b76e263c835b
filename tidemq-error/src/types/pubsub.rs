use std::{any::Any, time::Duration};

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Errors returned by broker operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// Publish, subscribe, broadcast or unsubscribe against a topic that was
    /// never created. The caller may retry after `create_topic`.
    #[error("topic '{topic}' does not exist")]
    UnknownTopic { topic: String },

    /// The consumer has no subscription (and therefore no offset) on the topic.
    #[error("consumer '{consumer}' is not subscribed to topic '{topic}'")]
    NotSubscribed { consumer: String, topic: String },

    /// Another consumer object already holds this id on the topic.
    #[error("consumer id '{consumer}' is already taken on topic '{topic}'")]
    AlreadySubscribed { consumer: String, topic: String },
}

/// Failure of a single `Consumer::update` call.
///
/// Always isolated to the consumer it happened on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("consumer rejected message: {reason}")]
    Rejected { reason: String },

    #[error("delivery timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

/// Errors while waiting on an event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecvError {
    #[error("event channel is closed")]
    Closed,

    #[error("receiver lagged behind by {0} events")]
    Lagged(u64),
}

/// Errors of the non-blocking receive on an event stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryRecvError {
    #[error("no events available")]
    Empty,

    #[error("event channel is closed")]
    Closed,

    #[error("receiver lagged behind by {0} events")]
    Lagged(u64),
}

impl BrokerError {
    pub fn unknown_topic(topic: impl Into<String>) -> Self {
        Self::UnknownTopic {
            topic: topic.into(),
        }
    }

    pub fn not_subscribed(
        consumer: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self::NotSubscribed {
            consumer: consumer.into(),
            topic: topic.into(),
        }
    }

    pub fn already_subscribed(
        consumer: impl Into<String>,
        topic: impl Into<String>,
    ) -> Self {
        Self::AlreadySubscribed {
            consumer: consumer.into(),
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        match self {
            Self::UnknownTopic { topic }
            | Self::NotSubscribed { topic, .. }
            | Self::AlreadySubscribed { topic, .. } => topic,
        }
    }
}

impl DeliveryError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

impl ErrorExt for BrokerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownTopic { .. } => StatusCode::TopicNotFound,
            Self::NotSubscribed { .. } => StatusCode::NotFound,
            Self::AlreadySubscribed { .. } => StatusCode::AlreadyExists,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for DeliveryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Rejected { .. } => StatusCode::DeliveryRejected,
            Self::Timeout { .. } => StatusCode::DeliveryTimeout,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for RecvError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Closed => StatusCode::ChannelClosed,
            Self::Lagged(_) => StatusCode::RateLimited,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for TryRecvError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Empty => StatusCode::NotFound,
            Self::Closed => StatusCode::ChannelClosed,
            Self::Lagged(_) => StatusCode::RateLimited,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// === Conversions ===

#[cfg(feature = "tokio")]
impl From<tokio::sync::broadcast::error::RecvError> for RecvError {
    fn from(err: tokio::sync::broadcast::error::RecvError) -> Self {
        match err {
            tokio::sync::broadcast::error::RecvError::Closed => RecvError::Closed,
            tokio::sync::broadcast::error::RecvError::Lagged(n) => RecvError::Lagged(n),
        }
    }
}

#[cfg(feature = "tokio")]
impl From<tokio::sync::broadcast::error::TryRecvError> for TryRecvError {
    fn from(err: tokio::sync::broadcast::error::TryRecvError) -> Self {
        match err {
            tokio::sync::broadcast::error::TryRecvError::Empty => TryRecvError::Empty,
            tokio::sync::broadcast::error::TryRecvError::Closed => TryRecvError::Closed,
            tokio::sync::broadcast::error::TryRecvError::Lagged(n) => TryRecvError::Lagged(n),
        }
    }
}
