//! Marketplace event consumer.
//!
//! Wires Kafka into the dispatcher: deserializes envelopes, hands them to
//! `EventDispatcher::dispatch` and dead-letters events that fail with an
//! infrastructure error. Malformed payloads are logged and skipped; the
//! at-least-once source must never be able to wedge the loop.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use mandilink_shared::config::AppConfig;
use mandilink_shared::events::EventEnvelope;
use mandilink_shared::kafka::{ConsumerMessage, KafkaConsumer, KafkaProducer, topics};

use crate::error::{NotifyError, Result};

use super::dispatcher::EventDispatcher;

/// Marketplace event consumer
pub struct EventConsumer {
    consumer: KafkaConsumer,
    dispatcher: Arc<EventDispatcher>,
    /// Events that fail processing go to the dead-letter topic for triage
    producer: KafkaProducer,
}

impl EventConsumer {
    pub fn new(
        config: &AppConfig,
        dispatcher: Arc<EventDispatcher>,
        producer: KafkaProducer,
    ) -> Result<Self> {
        let consumer = KafkaConsumer::new(&config.kafka, Some("events"))?;
        Ok(Self {
            consumer,
            dispatcher,
            producer,
        })
    }

    /// Run the consume loop until the shutdown signal flips
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        self.consumer.subscribe(&[topics::MARKET_EVENTS])?;

        info!(topic = topics::MARKET_EVENTS, "event consumer started");

        let dispatcher = self.dispatcher;
        let producer = self.producer;

        self.consumer
            .start(shutdown, |msg| {
                let dispatcher = dispatcher.clone();
                let producer = &producer;
                async move {
                    handle_message(&dispatcher, producer, &msg).await;
                    Ok(())
                }
            })
            .await;

        info!("event consumer stopped");
        Ok(())
    }
}

/// Handle one Kafka message.
///
/// Split out of the struct so tests can drive it without a live consumer.
async fn handle_message(
    dispatcher: &EventDispatcher,
    producer: &KafkaProducer,
    msg: &ConsumerMessage,
) {
    let envelope: EventEnvelope = match serde_json::from_slice(&msg.payload) {
        Ok(envelope) => envelope,
        Err(e) => {
            // a malformed payload will never parse on redelivery either
            error!(
                error = %e,
                topic = %msg.topic,
                partition = msg.partition,
                offset = msg.offset,
                "failed to deserialize event, skipping"
            );
            return;
        }
    };

    match dispatcher.dispatch(&envelope).await {
        Ok(true) => {
            info!(event_id = %envelope.event_id, "event processed");
        }
        Ok(false) => {
            info!(event_id = %envelope.event_id, "event skipped (duplicate or unroutable)");
        }
        Err(e) => {
            error!(
                event_id = %envelope.event_id,
                error = %e,
                "event processing failed, dead-lettering"
            );
            send_to_dlq(producer, &envelope, &e).await;
        }
    }
}

/// Forward a failed event to the dead-letter topic
async fn send_to_dlq(producer: &KafkaProducer, envelope: &EventEnvelope, cause: &NotifyError) {
    warn!(
        event_id = %envelope.event_id,
        code = cause.error_code(),
        "sending event to dead-letter queue"
    );

    if let Err(e) = producer
        .send_json(topics::DEAD_LETTER_QUEUE, &envelope.event_id, envelope)
        .await
    {
        error!(
            event_id = %envelope.event_id,
            error = %e,
            "failed to dead-letter event, it may be lost"
        );
    }
}
