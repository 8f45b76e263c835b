use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::{ProduceReport, TopicOutcome};
use crate::application::{Broker, Producer};

/// Producer that fans one payload out to every bound (topic, broker) pair.
pub struct FeedProducer {
    name: String,
    bindings: RwLock<HashMap<String, Arc<dyn Broker>>>,
}

impl FeedProducer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Bindings sorted by topic.
    fn snapshot(&self) -> Vec<(String, Arc<dyn Broker>)> {
        let mut bindings: Vec<_> = self
            .bindings
            .read()
            .iter()
            .map(|(topic, broker)| (topic.clone(), Arc::clone(broker)))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }
}

#[async_trait]
impl Producer for FeedProducer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn register_with_topic(
        &self,
        broker: Arc<dyn Broker>,
        topic: &str,
    ) {
        info!(
            producer = %self.name,
            broker = broker.name(),
            topic,
            "Registering with topic"
        );
        self.bindings.write().insert(topic.to_string(), broker);
    }

    async fn produce(
        &self,
        payload: Bytes,
    ) -> ProduceReport {
        let bindings = self.snapshot();
        if bindings.is_empty() {
            warn!(producer = %self.name, "Producer has no topic bindings, message goes nowhere");
            return ProduceReport::default();
        }

        info!(
            producer = %self.name,
            topics = ?bindings.iter().map(|(t, _)| t.as_str()).collect::<Vec<_>>(),
            "Producing message"
        );

        let publishes = bindings.into_iter().map(|(topic, broker)| {
            let payload = payload.clone();
            async move {
                let result = broker.publish(&topic, payload).await;
                TopicOutcome { topic, result }
            }
        });

        let report = ProduceReport {
            topics: join_all(publishes).await,
        };
        if !report.is_success() {
            warn!(
                producer = %self.name,
                failed = ?report.failed_topics(),
                "Produce finished with failures"
            );
        }
        report
    }

    fn topics(&self) -> Vec<String> {
        self.snapshot().into_iter().map(|(topic, _)| topic).collect()
    }
}
