use std::{path::PathBuf, sync::Arc};

use bytes::Bytes;
use clap::Parser;
use serde_json::json;
use tidemq::{
    init_logging, Broker, FeedProducer, LoggingConsumer, Producer, Settings, TopicBroker,
};
use tidemq_error::ResultExt;
use tracing::{info, warn};

/// In-process pub/sub demo: one producer feeds temperature readings to two
/// consumers through a topic broker.
#[derive(Debug, Parser)]
#[command(name = "tidemq", version, about)]
struct Cli {
    /// Optional settings file (TOML, YAML or JSON).
    #[arg(short, long, env = "TIDEMQ_CONFIG")]
    config: Option<PathBuf>,

    /// Topic the readings are published to.
    #[arg(short, long, default_value = "temperature_topic")]
    topic: String,

    /// Number of readings to produce.
    #[arg(short, long, default_value_t = 3)]
    readings: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(cli.config.as_deref()).context("loading settings")?;
    let logging = init_logging(settings.logging.clone()).context("initializing logging")?;

    let broker = Arc::new(TopicBroker::from_settings(&settings));
    broker.create_topic(&cli.topic).await;

    let producer = FeedProducer::new("temp_producer");
    producer.register_with_topic(broker.clone(), &cli.topic).await;

    for app in ["weather_app", "news_app"] {
        let consumer = Arc::new(LoggingConsumer::new(app, cli.topic.as_str()));
        broker.subscribe(consumer, &cli.topic).await?;
    }

    for i in 0..cli.readings {
        let reading = json!({ "temperature": 15 + i, "measurement": "C" });
        let report = producer.produce(Bytes::from(serde_json::to_vec(&reading)?)).await;
        if !report.is_success() {
            warn!(reading = i, failed = ?report.failed_topics(), "Reading not fully delivered");
        }
    }

    let stats = broker.stats().snapshot();
    info!(
        topics = stats.topics_created,
        published = stats.published,
        delivered = stats.messages_delivered,
        failures = stats.delivery_failures,
        "Broker stats"
    );

    logging.shutdown();
    Ok(())
}
