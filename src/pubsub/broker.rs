use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{mapref::entry::Entry, DashMap};
use futures::{stream, StreamExt};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{
    BroadcastReport, BrokerEvent, BrokerStats, ConsumerId, ConsumerOutcome, EventBus,
    EventSubscription, Message, MessageLog,
};
use crate::{
    application::{Broker, Consumer},
    BrokerError, DeliveryError, ErrorExt, Settings,
};

/// Delivery tuning of a [`TopicBroker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerOptions {
    /// Upper bound for one `Consumer::update` call. `None` waits forever.
    pub delivery_timeout: Option<Duration>,
    /// How many subscribers one broadcast delivers to at the same time.
    pub max_concurrent_deliveries: usize,
    /// Capacity of the event stream buffer.
    pub event_capacity: usize,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            delivery_timeout: Some(Duration::from_secs(5)),
            max_concurrent_deliveries: 64,
            event_capacity: 1024,
        }
    }
}

/// A subscriber entry: the consumer and its cursor on this topic.
///
/// The cursor mutex serializes delivery passes of the same (consumer, topic)
/// pair, so overlapping broadcasts cannot deliver a message twice.
struct SubscriberSlot {
    consumer: Arc<dyn Consumer>,
    cursor: Mutex<usize>,
}

impl SubscriberSlot {
    fn new(consumer: Arc<dyn Consumer>) -> Self {
        Self {
            consumer,
            cursor: Mutex::new(0),
        }
    }

    fn id(&self) -> &ConsumerId {
        self.consumer.id()
    }
}

struct TopicState {
    name: Arc<str>,
    log: MessageLog,
    subscribers: RwLock<Vec<Arc<SubscriberSlot>>>,
}

impl TopicState {
    fn new(name: Arc<str>) -> Self {
        Self {
            log: MessageLog::new(Arc::clone(&name)),
            name,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    fn slot(
        &self,
        consumer: &ConsumerId,
    ) -> Option<Arc<SubscriberSlot>> {
        self.subscribers
            .read()
            .iter()
            .find(|s| s.id() == consumer)
            .cloned()
    }
}

/// In-memory broker.
///
/// Owns the topic registry, the per-topic logs, the subscriber lists and the
/// (consumer, topic) offsets. Callers only ever hold consumer handles and ids.
///
/// - Topics are created explicitly and never removed.
/// - A new subscriber starts at offset 0 and receives the whole log on the
///   next broadcast.
/// - Broadcasts fan out over subscribers concurrently (capped by
///   `max_concurrent_deliveries`) and wait for all of them.
pub struct TopicBroker {
    name: Arc<str>,
    topics: DashMap<Arc<str>, Arc<TopicState>>,
    options: BrokerOptions,
    events: EventBus,
    stats: BrokerStats,
}

impl TopicBroker {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self::with_options(name, BrokerOptions::default())
    }

    pub fn with_options(
        name: impl AsRef<str>,
        options: BrokerOptions,
    ) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            topics: DashMap::new(),
            events: EventBus::new(options.event_capacity),
            options,
            stats: BrokerStats::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_options(&settings.broker_name, settings.broker_options())
    }

    pub fn options(&self) -> &BrokerOptions {
        &self.options
    }

    pub fn stats(&self) -> &BrokerStats {
        &self.stats
    }

    /// Stream of broker events emitted from now on.
    pub fn events(&self) -> EventSubscription {
        self.events.subscribe()
    }

    pub fn has_topic(
        &self,
        topic: &str,
    ) -> bool {
        self.topics.contains_key(topic)
    }

    /// Number of messages in the topic log.
    pub fn log_len(
        &self,
        topic: &str,
    ) -> Result<usize, BrokerError> {
        Ok(self.topic(topic)?.log.len())
    }

    /// Snapshot of the topic log.
    pub fn messages(
        &self,
        topic: &str,
    ) -> Result<Vec<Message>, BrokerError> {
        Ok(self.topic(topic)?.log.snapshot())
    }

    /// Subscribed consumer ids in subscription order.
    pub fn subscribers(
        &self,
        topic: &str,
    ) -> Result<Vec<ConsumerId>, BrokerError> {
        let state = self.topic(topic)?;
        let ids = state
            .subscribers
            .read()
            .iter()
            .map(|s| s.id().clone())
            .collect();
        Ok(ids)
    }

    /// Next unread index of `consumer` on `topic`.
    ///
    /// Waits for an in-flight delivery pass of that consumer to finish.
    pub async fn offset(
        &self,
        consumer: &ConsumerId,
        topic: &str,
    ) -> Result<usize, BrokerError> {
        let state = self.topic(topic)?;
        let slot = state
            .slot(consumer)
            .ok_or_else(|| BrokerError::not_subscribed(consumer.as_str(), topic))?;
        let cursor = *slot.cursor.lock().await;
        Ok(cursor)
    }

    /// Delivers every unread message of `topic` to one subscriber, in order,
    /// and advances its offset.
    ///
    /// On a failed `update` the pass stops: the offset is left on the failed
    /// message, so it and everything after it are retried on the next pass
    /// while nothing already delivered is sent again.
    pub async fn update_consumer(
        &self,
        consumer: &ConsumerId,
        topic: &str,
    ) -> Result<ConsumerOutcome, BrokerError> {
        let state = self.topic(topic)?;
        let slot = state
            .slot(consumer)
            .ok_or_else(|| BrokerError::not_subscribed(consumer.as_str(), topic))?;
        Ok(self.deliver(&state, &slot).await)
    }

    fn topic(
        &self,
        topic: &str,
    ) -> Result<Arc<TopicState>, BrokerError> {
        self.topics
            .get(topic)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| BrokerError::unknown_topic(topic))
    }

    async fn broadcast_topic(
        &self,
        state: &TopicState,
    ) -> BroadcastReport {
        let subscribers: Vec<Arc<SubscriberSlot>> = state.subscribers.read().clone();

        if subscribers.is_empty() {
            debug!(
                broker = %self.name,
                topic = %state.name,
                "No subscribers, nothing to broadcast"
            );
            return BroadcastReport::new(&*state.name, Vec::new());
        }

        info!(
            broker = %self.name,
            topic = %state.name,
            subscribers = subscribers.len(),
            "Broadcasting topic"
        );

        let deliveries: Vec<_> = subscribers
            .iter()
            .map(|slot| self.deliver(state, slot))
            .collect();
        let outcomes = stream::iter(deliveries)
            .buffered(self.options.max_concurrent_deliveries.max(1))
            .collect::<Vec<_>>()
            .await;

        BroadcastReport::new(&*state.name, outcomes)
    }

    async fn deliver(
        &self,
        state: &TopicState,
        slot: &SubscriberSlot,
    ) -> ConsumerOutcome {
        let mut cursor = slot.cursor.lock().await;
        let pending = state.log.read_from(*cursor);

        debug!(
            broker = %self.name,
            topic = %state.name,
            consumer = %slot.id(),
            from = *cursor,
            to = *cursor + pending.len(),
            "Updating consumer"
        );

        let mut delivered = 0;
        let mut error = None;
        for message in &pending {
            match self.deliver_one(slot.consumer.as_ref(), message).await {
                Ok(()) => {
                    *cursor = message.offset + 1;
                    delivered += 1;
                }
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        self.stats.record_delivered(delivered);
        let offset = *cursor;
        drop(cursor);

        match &error {
            None => {
                debug!(
                    broker = %self.name,
                    topic = %state.name,
                    consumer = %slot.id(),
                    delivered,
                    offset,
                    "Consumer up to date"
                );
                if delivered > 0 {
                    self.events.emit(BrokerEvent::DeliverySucceeded {
                        topic: Arc::clone(&state.name),
                        consumer: slot.id().clone(),
                        delivered,
                        offset,
                    });
                }
            }
            Some(e) => {
                self.stats.record_delivery_failure();
                warn!(
                    broker = %self.name,
                    topic = %state.name,
                    consumer = %slot.id(),
                    delivered,
                    offset,
                    error = %e,
                    status = %e.status_code(),
                    retryable = e.status_code().is_retryable(),
                    "Failed to update consumer"
                );
                self.events.emit(BrokerEvent::DeliveryFailed {
                    topic: Arc::clone(&state.name),
                    consumer: slot.id().clone(),
                    offset,
                    error: e.clone(),
                });
            }
        }

        ConsumerOutcome {
            consumer: slot.id().clone(),
            delivered,
            offset,
            error,
        }
    }

    async fn deliver_one(
        &self,
        consumer: &dyn Consumer,
        message: &Message,
    ) -> Result<(), DeliveryError> {
        match self.options.delivery_timeout {
            Some(limit) => match tokio::time::timeout(limit, consumer.update(message)).await {
                Ok(res) => res,
                Err(_) => Err(DeliveryError::Timeout { after: limit }),
            },
            None => consumer.update(message).await,
        }
    }
}

#[async_trait]
impl Broker for TopicBroker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_topic(
        &self,
        topic: &str,
    ) -> bool {
        match self.topics.entry(Arc::from(topic)) {
            Entry::Occupied(_) => {
                debug!(broker = %self.name, topic, "Topic already exists");
                false
            }
            Entry::Vacant(entry) => {
                let name = Arc::clone(entry.key());
                entry.insert(Arc::new(TopicState::new(Arc::clone(&name))));
                self.stats.record_topic_created();
                info!(broker = %self.name, topic, "Created topic");
                self.events.emit(BrokerEvent::TopicCreated { topic: name });
                true
            }
        }
    }

    async fn get_all_topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self
            .topics
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        topics.sort_unstable();
        topics
    }

    async fn subscribe(
        &self,
        consumer: Arc<dyn Consumer>,
        topic: &str,
    ) -> Result<(), BrokerError> {
        let state = self.topic(topic).inspect_err(|_| {
            warn!(
                broker = %self.name,
                consumer = %consumer.id(),
                topic,
                "Subscribe failed, topic does not exist"
            );
        })?;

        let id = consumer.id().clone();
        {
            let mut subscribers = state.subscribers.write();
            if let Some(existing) = subscribers.iter().find(|s| s.id() == &id) {
                if Arc::ptr_eq(&existing.consumer, &consumer) {
                    debug!(broker = %self.name, consumer = %id, topic, "Already subscribed");
                    return Ok(());
                }
                warn!(
                    broker = %self.name,
                    consumer = %id,
                    topic,
                    "Subscribe failed, id is taken by another consumer"
                );
                return Err(BrokerError::already_subscribed(id.as_str(), topic));
            }
            subscribers.push(Arc::new(SubscriberSlot::new(consumer)));
        }

        info!(broker = %self.name, consumer = %id, topic, offset = 0, "Subscribed consumer");
        self.events.emit(BrokerEvent::ConsumerSubscribed {
            topic: Arc::clone(&state.name),
            consumer: id,
        });
        Ok(())
    }

    async fn unsubscribe(
        &self,
        consumer: &ConsumerId,
        topic: &str,
    ) -> Result<bool, BrokerError> {
        let state = self.topic(topic)?;
        let removed = {
            let mut subscribers = state.subscribers.write();
            let before = subscribers.len();
            subscribers.retain(|s| s.id() != consumer);
            subscribers.len() != before
        };

        if removed {
            info!(broker = %self.name, consumer = %consumer, topic, "Unsubscribed consumer");
            self.events.emit(BrokerEvent::ConsumerUnsubscribed {
                topic: Arc::clone(&state.name),
                consumer: consumer.clone(),
            });
        }
        Ok(removed)
    }

    async fn publish(
        &self,
        topic: &str,
        payload: Bytes,
    ) -> Result<BroadcastReport, BrokerError> {
        let state = match self.topic(topic) {
            Ok(state) => state,
            Err(e) => {
                self.stats.record_publish_rejected();
                warn!(broker = %self.name, topic, "Publish failed, topic does not exist");
                return Err(e);
            }
        };

        let message = state.log.append(payload);
        self.stats.record_published();
        info!(
            broker = %self.name,
            topic,
            offset = message.offset,
            bytes = message.payload.len(),
            "Published message"
        );
        self.events.emit(BrokerEvent::MessagePublished {
            topic: Arc::clone(&state.name),
            offset: message.offset,
        });

        Ok(self.broadcast_topic(&state).await)
    }

    async fn broadcast(
        &self,
        topic: &str,
    ) -> Result<BroadcastReport, BrokerError> {
        let state = self.topic(topic)?;
        Ok(self.broadcast_topic(&state).await)
    }
}
