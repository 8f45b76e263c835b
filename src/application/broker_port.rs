//! Broker capability.
//!
//! - `create_topic`: register a topic (idempotent).
//! - `get_all_topics`: snapshot of registered topic names.
//! - `subscribe` / `unsubscribe`: manage a topic's subscriber list.
//! - `publish`: append to the topic log, then broadcast.
//! - `broadcast`: deliver every unread message to every subscriber.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{application::Consumer, BroadcastReport, BrokerError, ConsumerId};

#[async_trait]
pub trait Broker: Send + Sync {
    /// Broker name, used in logs and events.
    fn name(&self) -> &str;
    /// Returns `true` if the topic is new, `false` if it already existed.
    async fn create_topic(
        &self,
        topic: &str,
    ) -> bool;
    async fn get_all_topics(&self) -> Vec<String>;
    /// Adds the consumer with its offset at 0: the next broadcast delivers the
    /// whole existing log.
    ///
    /// Re-subscribing the same consumer is a no-op. A different consumer with
    /// an id already on the topic gets `BrokerError::AlreadySubscribed`.
    async fn subscribe(
        &self,
        consumer: Arc<dyn Consumer>,
        topic: &str,
    ) -> Result<(), BrokerError>;
    /// Returns `Ok(false)` when the consumer was not subscribed.
    async fn unsubscribe(
        &self,
        consumer: &ConsumerId,
        topic: &str,
    ) -> Result<bool, BrokerError>;
    async fn publish(
        &self,
        topic: &str,
        payload: Bytes,
    ) -> Result<BroadcastReport, BrokerError>;
    async fn broadcast(
        &self,
        topic: &str,
    ) -> Result<BroadcastReport, BrokerError>;
}
