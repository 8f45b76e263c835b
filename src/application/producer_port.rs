//! Producer capability: a feed bound to one or more (topic, broker) pairs.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{application::Broker, ProduceReport};

#[async_trait]
pub trait Producer: Send + Sync {
    fn name(&self) -> &str;
    /// Binds `topic` to `broker`. The last binding for a topic wins.
    async fn register_with_topic(
        &self,
        broker: Arc<dyn Broker>,
        topic: &str,
    );
    /// Publishes the payload to every bound topic concurrently.
    async fn produce(
        &self,
        payload: Bytes,
    ) -> ProduceReport;
    /// Bound topic names, sorted.
    fn topics(&self) -> Vec<String>;
}
