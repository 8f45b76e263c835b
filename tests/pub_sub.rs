use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use rstest::rstest;
use serde::Deserialize;
use tidemq::{
    Broker, BrokerError, BrokerEvent, ChannelConsumer, CollectingConsumer, Consumer, ConsumerId,
    DeliveryError, FeedProducer, FnConsumer, Message, Producer, TopicBroker,
};

async fn broker_with(topics: &[&str]) -> Arc<TopicBroker> {
    let broker = Arc::new(TopicBroker::new("integration"));
    for topic in topics {
        assert!(broker.create_topic(topic).await);
    }
    broker
}

/// Late subscribers catch up on the whole log while early ones only get what
/// they have not seen yet.
#[tokio::test]
async fn test_late_subscriber_catches_up() {
    let broker = broker_with(&["t"]).await;

    let report = broker.publish("t", Bytes::from("m1")).await.unwrap();
    assert!(report.is_success());
    assert_eq!(broker.log_len("t").unwrap(), 1);

    let a = Arc::new(CollectingConsumer::new("A", "t"));
    broker.subscribe(a.clone(), "t").await.unwrap();
    assert_eq!(broker.offset(a.id(), "t").await.unwrap(), 0);

    broker.publish("t", Bytes::from("m2")).await.unwrap();
    assert_eq!(a.payloads(), vec!["m1", "m2"]);
    assert_eq!(broker.offset(a.id(), "t").await.unwrap(), 2);

    let b = Arc::new(CollectingConsumer::new("B", "t"));
    broker.subscribe(b.clone(), "t").await.unwrap();
    assert_eq!(broker.offset(b.id(), "t").await.unwrap(), 0);

    let report = broker.publish("t", Bytes::from("m3")).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.outcome(a.id()).unwrap().delivered, 1);
    assert_eq!(report.outcome(b.id()).unwrap().delivered, 3);

    assert_eq!(a.payloads(), vec!["m1", "m2", "m3"]);
    assert_eq!(b.payloads(), vec!["m1", "m2", "m3"]);
    assert_eq!(broker.offset(a.id(), "t").await.unwrap(), 3);
    assert_eq!(broker.offset(b.id(), "t").await.unwrap(), 3);
}

/// A second consumer object cannot take over an id that is already
/// subscribed; the first keeps receiving.
#[tokio::test]
async fn test_reused_consumer_id_is_rejected() {
    let broker = broker_with(&["t"]).await;
    let first = Arc::new(CollectingConsumer::new("a", "t"));
    let second = Arc::new(CollectingConsumer::new("a", "t"));

    broker.subscribe(first.clone(), "t").await.unwrap();
    broker.subscribe(first.clone(), "t").await.unwrap();
    assert_eq!(
        broker.subscribe(second.clone(), "t").await,
        Err(BrokerError::AlreadySubscribed {
            consumer: "a".into(),
            topic: "t".into(),
        })
    );

    broker.publish("t", Bytes::from("m1")).await.unwrap();
    assert_eq!(first.payloads(), vec!["m1"]);
    assert!(second.payloads().is_empty());
    assert_eq!(broker.subscribers("t").unwrap(), vec![ConsumerId::from("a")]);
}

#[tokio::test]
async fn test_publish_to_unregistered_topic() {
    let broker = broker_with(&["t"]).await;

    let err = broker.publish("ghost", Bytes::from("m1")).await.unwrap_err();
    assert_eq!(err, BrokerError::unknown_topic("ghost"));
    assert_eq!(broker.get_all_topics().await, vec!["t"]);
    assert!(matches!(
        broker.log_len("ghost"),
        Err(BrokerError::UnknownTopic { .. })
    ));
    assert!(broker.messages("ghost").is_err());
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
#[case(25)]
#[tokio::test]
async fn test_every_publish_appends_exactly_once(#[case] n: usize) {
    let broker = broker_with(&["t"]).await;
    let c = Arc::new(CollectingConsumer::new("c", "t"));
    broker.subscribe(c.clone(), "t").await.unwrap();

    for i in 0..n {
        broker.publish("t", Bytes::from(format!("m{i}"))).await.unwrap();
    }

    let log = broker.messages("t").unwrap();
    assert_eq!(log.len(), n);
    for (i, message) in log.iter().enumerate() {
        assert_eq!(message.offset, i);
        assert_eq!(message.payload_str(), format!("m{i}"));
    }
    assert_eq!(c.received(), log);
    assert_eq!(broker.offset(c.id(), "t").await.unwrap(), n);
}

/// A consumer that keeps failing does not hold back the others and loses
/// nothing once it recovers.
#[tokio::test]
async fn test_failing_consumer_is_isolated() {
    let broker = broker_with(&["t"]).await;
    let (broken, rx) = ChannelConsumer::new("broken", "t", 8);
    drop(rx);
    let broken = Arc::new(broken);
    let healthy = Arc::new(CollectingConsumer::new("healthy", "t"));
    broker.subscribe(broken.clone(), "t").await.unwrap();
    broker.subscribe(healthy.clone(), "t").await.unwrap();

    for m in ["m1", "m2"] {
        let report = broker.publish("t", Bytes::from(m)).await.unwrap();
        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
        assert!(matches!(
            report.outcome(broken.id()).unwrap().error,
            Some(DeliveryError::Rejected { .. })
        ));
    }

    assert_eq!(healthy.payloads(), vec!["m1", "m2"]);
    assert_eq!(broker.offset(broken.id(), "t").await.unwrap(), 0);
    assert_eq!(broker.offset(healthy.id(), "t").await.unwrap(), 2);
}

/// One consumer on two topics keeps an independent offset per topic.
#[tokio::test]
async fn test_offsets_are_per_topic() {
    let broker = broker_with(&["temperature", "humidity"]).await;
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let consumer = Arc::new(FnConsumer::new("dashboard", "temperature", move |m: Message| {
        let sink = Arc::clone(&sink);
        async move {
            sink.lock().push(format!("{}:{}", m.topic, m.payload_str()));
            Ok(())
        }
    }));
    broker.subscribe(consumer.clone(), "temperature").await.unwrap();
    broker.subscribe(consumer.clone(), "humidity").await.unwrap();

    for m in ["t1", "t2", "t3"] {
        broker.publish("temperature", Bytes::from(m)).await.unwrap();
    }
    broker.publish("humidity", Bytes::from("h1")).await.unwrap();

    assert_eq!(broker.offset(consumer.id(), "temperature").await.unwrap(), 3);
    assert_eq!(broker.offset(consumer.id(), "humidity").await.unwrap(), 1);
    assert_eq!(
        *seen.lock(),
        vec!["temperature:t1", "temperature:t2", "temperature:t3", "humidity:h1"]
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct Reading {
    temperature: i32,
    measurement: String,
}

#[tokio::test]
async fn test_producer_feeds_channel_consumers() {
    let broker = broker_with(&["temperature_topic"]).await;
    let (weather, mut weather_rx) = ChannelConsumer::new("weather_app", "temperature_topic", 16);
    let (news, mut news_rx) = ChannelConsumer::new("news_app", "temperature_topic", 16);
    broker.subscribe(Arc::new(weather), "temperature_topic").await.unwrap();
    broker.subscribe(Arc::new(news), "temperature_topic").await.unwrap();

    let producer = FeedProducer::new("temp_producer");
    producer
        .register_with_topic(broker.clone(), "temperature_topic")
        .await;
    assert_eq!(producer.name(), "temp_producer");

    for i in 0..3 {
        let payload = format!(r#"{{"temperature":{},"measurement":"C"}}"#, 15 + i);
        assert!(producer.produce(Bytes::from(payload)).await.is_success());
    }

    for rx in [&mut weather_rx, &mut news_rx] {
        for i in 0..3 {
            let message = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(message.offset, i);
            assert_eq!(
                message.json::<Reading>().unwrap(),
                Reading {
                    temperature: 15 + i as i32,
                    measurement: "C".into()
                }
            );
        }
        assert!(rx.try_recv().is_err());
    }
}

#[tokio::test]
async fn test_event_stream_reports_failures() {
    let broker = broker_with(&["t"]).await;
    let mut events = broker.events();

    let rejecting = Arc::new(FnConsumer::new("rejecting", "t", |_m: Message| async {
        Err(DeliveryError::rejected("full"))
    }));
    broker.subscribe(rejecting.clone(), "t").await.unwrap();
    broker.publish("t", Bytes::from("m1")).await.unwrap();

    let failed: Vec<_> = events
        .drain()
        .into_iter()
        .filter(|e| matches!(e, BrokerEvent::DeliveryFailed { .. }))
        .collect();
    assert_eq!(
        failed,
        vec![BrokerEvent::DeliveryFailed {
            topic: Arc::from("t"),
            consumer: ConsumerId::from("rejecting"),
            offset: 0,
            error: DeliveryError::rejected("full"),
        }]
    );
    assert_eq!(broker.stats().snapshot().delivery_failures, 1);
}

#[tokio::test]
async fn test_broker_as_trait_object() {
    let broker: Arc<dyn Broker> = Arc::new(TopicBroker::new("dyn"));
    assert_eq!(broker.name(), "dyn");
    assert!(broker.create_topic("a").await);

    let consumer: Arc<dyn Consumer> = Arc::new(CollectingConsumer::new("c", "a"));
    broker.subscribe(Arc::clone(&consumer), "a").await.unwrap();
    assert!(broker.publish("a", Bytes::from("x")).await.unwrap().is_success());
    assert!(broker.broadcast("a").await.unwrap().is_success());
    assert!(broker.unsubscribe(consumer.id(), "a").await.unwrap());
}
