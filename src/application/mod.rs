pub mod broker_port;
pub mod consumer_port;
pub mod producer_port;

pub use broker_port::Broker;
pub use consumer_port::Consumer;
pub use producer_port::Producer;
