//! Consumer capability.
//!
//! A consumer is the receiving end of a subscription: the broker calls
//! `update` once per unread message, in log order. A failing `update` fails
//! only that consumer's delivery pass; sibling consumers are unaffected.

use async_trait::async_trait;

use crate::{ConsumerId, DeliveryError, Message};

#[async_trait]
pub trait Consumer: Send + Sync {
    /// Identity used to key the consumer's offset on each topic.
    fn id(&self) -> &ConsumerId;
    /// Topic the consumer was created for.
    fn topic(&self) -> &str;
    /// Processes one message.
    ///
    /// The broker holds this consumer's cursor on the topic while `update`
    /// runs. Publishing to that same topic from here waits on the cursor
    /// until the call returns, so it only completes by hitting the delivery
    /// timeout; with no timeout configured it never completes. Hand such
    /// messages to a spawned task instead.
    async fn update(
        &self,
        message: &Message,
    ) -> Result<(), DeliveryError>;
}
