//! Kafka infrastructure wrappers.
//!
//! Wraps the low-level rdkafka API into business-friendly Producer/Consumer
//! abstractions with uniform serialization, error mapping and graceful
//! shutdown semantics, so services do not repeat the same boilerplate.

use std::collections::HashMap;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::KafkaConfig;
use crate::error::SharedError;

// ---------------------------------------------------------------------------
// Topic constants
// ---------------------------------------------------------------------------

/// All topic names in one place, so spellings cannot drift between services
pub mod topics {
    pub const MARKET_EVENTS: &str = "mandi.market.events";
    pub const DEAD_LETTER_QUEUE: &str = "mandi.notifications.dlq";
}

// ---------------------------------------------------------------------------
// ConsumerMessage
// ---------------------------------------------------------------------------

/// Owned representation of a consumed Kafka message.
///
/// Converts rdkafka's `BorrowedMessage` (lifetime-bound) into an owned struct
/// that can safely cross await points into async handlers.
#[derive(Debug, Clone)]
pub struct ConsumerMessage {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub timestamp: Option<i64>,
    pub headers: HashMap<String, String>,
}

impl ConsumerMessage {
    /// Extract and own every field of a borrowed message
    fn from_borrowed(msg: &BorrowedMessage<'_>) -> Self {
        let key = msg
            .key()
            .and_then(|k| std::str::from_utf8(k).ok())
            .map(String::from);

        let payload = msg.payload().map(|p| p.to_vec()).unwrap_or_default();

        let timestamp = msg.timestamp().to_millis();

        let mut headers = HashMap::new();
        if let Some(h) = msg.headers() {
            for idx in 0..h.count() {
                let header = h.get(idx);
                if let Some(raw) = header.value
                    && let Ok(value) = std::str::from_utf8(raw)
                {
                    headers.insert(header.key.to_string(), value.to_string());
                }
            }
        }

        Self {
            topic: msg.topic().to_string(),
            partition: msg.partition(),
            offset: msg.offset(),
            key,
            payload,
            timestamp,
            headers,
        }
    }

    /// View the payload as UTF-8
    pub fn payload_str(&self) -> Result<&str, SharedError> {
        std::str::from_utf8(&self.payload)
            .map_err(|e| SharedError::Kafka(format!("payload is not UTF-8: {e}")))
    }

    /// Deserialize a JSON payload into the target type
    pub fn deserialize_payload<T: DeserializeOwned>(&self) -> Result<T, SharedError> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| SharedError::Kafka(format!("payload deserialization failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// KafkaProducer
// ---------------------------------------------------------------------------

/// Business-facing Kafka producer.
///
/// Wraps `FutureProducer` with typed JSON sends; derives Clone since
/// `FutureProducer` is internally Arc-wrapped.
#[derive(Clone)]
pub struct KafkaProducer {
    producer: FutureProducer,
}

impl KafkaProducer {
    /// Create a producer from configuration.
    ///
    /// `message.timeout.ms` is 5 seconds: if a message cannot be delivered by
    /// then, the caller should retry or dead-letter rather than wait forever.
    pub fn new(config: &KafkaConfig) -> Result<Self, SharedError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| SharedError::Kafka(format!("failed to create producer: {e}")))?;

        info!(brokers = %config.brokers, "Kafka producer initialized");
        Ok(Self { producer })
    }

    /// Send raw bytes
    pub async fn send(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<(i32, i64), SharedError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        let delivery = self
            .producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| SharedError::Kafka(format!("failed to send message: {e}")))?;

        debug!(
            topic,
            key,
            partition = delivery.partition,
            offset = delivery.offset,
            "message sent"
        );
        Ok((delivery.partition, delivery.offset))
    }

    /// Serialize a value to JSON and send it.
    ///
    /// Serialization and the network send are separate steps so either
    /// failure can be diagnosed on its own.
    pub async fn send_json<T: Serialize>(
        &self,
        topic: &str,
        key: &str,
        value: &T,
    ) -> Result<(i32, i64), SharedError> {
        let payload = serde_json::to_vec(value)
            .map_err(|e| SharedError::Kafka(format!("serialization failed: {e}")))?;

        self.send(topic, key, &payload).await
    }
}

// ---------------------------------------------------------------------------
// KafkaConsumer
// ---------------------------------------------------------------------------

/// Business-facing Kafka consumer.
///
/// Wraps `StreamConsumer` with watch-channel based graceful shutdown so
/// in-flight handlers finish before the process exits.
pub struct KafkaConsumer {
    consumer: StreamConsumer,
}

impl KafkaConsumer {
    /// Create a consumer.
    ///
    /// `group_id_suffix` lets distinct consuming concerns within one service
    /// use independent consumer groups, e.g. "mandi-notification.events".
    pub fn new(config: &KafkaConfig, group_id_suffix: Option<&str>) -> Result<Self, SharedError> {
        let group_id = match group_id_suffix {
            Some(suffix) => format!("{}.{}", config.consumer_group, suffix),
            None => config.consumer_group.clone(),
        };

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &group_id)
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| SharedError::Kafka(format!("failed to create consumer: {e}")))?;

        info!(brokers = %config.brokers, group_id, "Kafka consumer initialized");
        Ok(Self { consumer })
    }

    /// Subscribe to the given topics
    pub fn subscribe(&self, topics: &[&str]) -> Result<(), SharedError> {
        self.consumer
            .subscribe(topics)
            .map_err(|e| SharedError::Kafka(format!("failed to subscribe: {e}")))?;

        info!(?topics, "subscribed to Kafka topics");
        Ok(())
    }

    /// Run the consume loop.
    ///
    /// `tokio::select!` watches the message stream and the shutdown signal:
    /// - handler errors are logged without breaking the loop, so one bad
    ///   message cannot stop the whole consumer
    /// - when the shutdown flag flips to true the loop exits, letting any
    ///   handler already running complete naturally
    pub async fn start<F, Fut>(self, mut shutdown: watch::Receiver<bool>, handler: F)
    where
        F: Fn(ConsumerMessage) -> Fut,
        Fut: std::future::Future<Output = Result<(), SharedError>>,
    {
        use futures::StreamExt;

        let stream = self.consumer.stream();
        futures::pin_mut!(stream);

        info!("Kafka consume loop started");

        loop {
            tokio::select! {
                // prefer the shutdown signal so exit is prompt
                biased;

                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("shutdown signal received, Kafka consume loop exiting");
                        break;
                    }
                }

                msg_result = stream.next() => {
                    let Some(msg_result) = msg_result else {
                        warn!("Kafka message stream ended unexpectedly");
                        break;
                    };

                    match msg_result {
                        Ok(borrowed_msg) => {
                            let msg = ConsumerMessage::from_borrowed(&borrowed_msg);
                            debug!(
                                topic = %msg.topic,
                                partition = msg.partition,
                                offset = msg.offset,
                                "received Kafka message"
                            );

                            if let Err(e) = handler(msg).await {
                                error!(error = %e, "failed to handle Kafka message");
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "error receiving Kafka message");
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
