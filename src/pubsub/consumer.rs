use std::{fmt, future::Future, sync::Arc};

use async_trait::async_trait;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use super::Message;
use crate::{application::Consumer, DeliveryError};

/// Identity of a consumer. Offsets are keyed by (consumer id, topic).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(Arc<str>);

impl ConsumerId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Random UUID v4 id for anonymous consumers.
    pub fn generate() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConsumerId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

////////////////////////////////////////////////////////////////////////////////
// LoggingConsumer
////////////////////////////////////////////////////////////////////////////////

/// Writes every received message to the log. Never fails.
#[derive(Debug, Clone)]
pub struct LoggingConsumer {
    id: ConsumerId,
    topic: String,
}

impl LoggingConsumer {
    pub fn new(
        name: impl Into<ConsumerId>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            id: name.into(),
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl Consumer for LoggingConsumer {
    fn id(&self) -> &ConsumerId {
        &self.id
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn update(
        &self,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        info!(
            consumer = %self.id,
            topic = %message.topic,
            offset = message.offset,
            payload = %message.payload_str(),
            "Received message"
        );
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// ChannelConsumer
////////////////////////////////////////////////////////////////////////////////

/// Forwards messages into a bounded `mpsc` channel.
///
/// A full channel makes `update` wait, which the broker's delivery timeout
/// turns into a failed pass. Once the receiver is dropped every delivery is
/// rejected.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    id: ConsumerId,
    topic: String,
    tx: mpsc::Sender<Message>,
}

impl ChannelConsumer {
    pub fn new(
        name: impl Into<ConsumerId>,
        topic: impl Into<String>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let consumer = Self {
            id: name.into(),
            topic: topic.into(),
            tx,
        };
        (consumer, rx)
    }
}

#[async_trait]
impl Consumer for ChannelConsumer {
    fn id(&self) -> &ConsumerId {
        &self.id
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn update(
        &self,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        self.tx
            .send(message.clone())
            .await
            .map_err(|_| DeliveryError::rejected("receiver dropped"))
    }
}

////////////////////////////////////////////////////////////////////////////////
// CollectingConsumer
////////////////////////////////////////////////////////////////////////////////

/// Keeps every received message in memory.
#[derive(Debug)]
pub struct CollectingConsumer {
    id: ConsumerId,
    topic: String,
    received: Mutex<Vec<Message>>,
}

impl CollectingConsumer {
    pub fn new(
        name: impl Into<ConsumerId>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            id: name.into(),
            topic: topic.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Messages received so far, in delivery order.
    pub fn received(&self) -> Vec<Message> {
        self.received.lock().clone()
    }

    /// Payloads received so far as text.
    pub fn payloads(&self) -> Vec<String> {
        self.received
            .lock()
            .iter()
            .map(|m| m.payload_str().into_owned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.received.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.received.lock().is_empty()
    }
}

#[async_trait]
impl Consumer for CollectingConsumer {
    fn id(&self) -> &ConsumerId {
        &self.id
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn update(
        &self,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        self.received.lock().push(message.clone());
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// FnConsumer
////////////////////////////////////////////////////////////////////////////////

type Handler = dyn Fn(Message) -> BoxFuture<'static, Result<(), DeliveryError>> + Send + Sync;

/// Consumer backed by an async closure.
pub struct FnConsumer {
    id: ConsumerId,
    topic: String,
    handler: Box<Handler>,
}

impl FnConsumer {
    pub fn new<F, Fut>(
        name: impl Into<ConsumerId>,
        topic: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), DeliveryError>> + Send + 'static,
    {
        Self {
            id: name.into(),
            topic: topic.into(),
            handler: Box::new(move |message| Box::pin(handler(message))),
        }
    }
}

impl fmt::Debug for FnConsumer {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("FnConsumer")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Consumer for FnConsumer {
    fn id(&self) -> &ConsumerId {
        &self.id
    }

    fn topic(&self) -> &str {
        &self.topic
    }

    async fn update(
        &self,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        (self.handler)(message.clone()).await
    }
}
