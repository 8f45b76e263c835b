//! Publish-subscribe subsystem.
//!
//! - `broker`: topic registry, logs, offsets and fan-out delivery.
//! - `consumer`: consumer identity and the stock consumer variants.
//! - `events` / `stats`: observability hooks.
//! - `log`: the per-topic append-only message log.
//! - `message`: the published message.
//! - `producer`: fan-out of one payload to several bound topics.
//! - `report`: per-consumer and per-topic results of fan-out operations.

pub mod broker;
pub mod consumer;
pub mod events;
pub mod log;
pub mod message;
pub mod producer;
pub mod report;
pub mod stats;

// Publicly re-export the types of the submodules to simplify access from
// external code.
pub use broker::*;
pub use consumer::*;
pub(crate) use events::EventBus;
pub use events::{BrokerEvent, EventSubscription};
pub use log::*;
pub use message::*;
pub use producer::*;
pub use report::*;
pub use stats::*;
