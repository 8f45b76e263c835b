/// Ports: the `Broker`, `Producer` and `Consumer` capabilities.
pub mod application;
/// Settings loading (defaults, config file, `TIDEMQ_*` environment).
pub mod config;
/// Logging setup (filters, formats, console and file sinks).
pub mod logging;
/// Pub/Sub: topic broker, message log, consumers, producers.
pub mod pubsub;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Capabilities.
pub use application::{Broker, Consumer, Producer};
/// Settings.
pub use self::config::Settings;
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingHandle};
/// Pub/Sub API.
pub use pubsub::{
    BroadcastReport, BrokerEvent, BrokerOptions, BrokerStats, ChannelConsumer, CollectingConsumer,
    ConsumerId, ConsumerOutcome, EventSubscription, FeedProducer, FnConsumer, LoggingConsumer,
    Message, MessageLog, ProduceReport, StatsSnapshot, TopicBroker, TopicOutcome,
};
/// Errors and result types.
pub use tidemq_error::{
    BrokerError, DeliveryError, ErrorExt, RecvError, SettingsError, StackError, StatusCode,
    TideResult, TryRecvError,
};
