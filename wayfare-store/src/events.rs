//! Booking event emission. The request path only ever enqueues onto an
//! in-process channel after its transaction commits; a single background
//! consumer drains the queue into Kafka with bounded retries. Publish
//! failures are logged, never raised back into a handler.

use std::time::Duration;

use chrono::Utc;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use wayfare_core::booking::{BillingTransaction, Booking, BookingItem};
use wayfare_shared::events::{
    BookingConfirmedEvent, BookingFailedEvent, TOPIC_BOOKING_CONFIRMED, TOPIC_BOOKING_FAILED,
};

const PUBLISH_ATTEMPTS: u32 = 5;
const RETRY_BASE_MS: u64 = 250;

#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
}

impl EventProducer {
    pub fn new(brokers: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self { producer })
    }

    pub async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &str,
    ) -> Result<(), rdkafka::error::KafkaError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self.producer.send(record, Timeout::After(Duration::from_secs(0))).await {
            Ok(delivery) => {
                info!(
                    "Published {} key={} partition={} offset={}",
                    topic, key, delivery.partition, delivery.offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                warn!("Publish to {} failed: {}", topic, e);
                Err(e)
            }
        }
    }
}

#[derive(Debug)]
struct OutboundEvent {
    topic: &'static str,
    key: String,
    payload: String,
}

/// Fire-and-forget front of the event pipeline. Cloneable; one background
/// drain task per process.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::UnboundedSender<OutboundEvent>,
    origin: String,
}

impl EventPublisher {
    pub fn spawn(producer: EventProducer, origin: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(drain_queue(producer, rx));
        EventPublisher {
            tx,
            origin: origin.to_string(),
        }
    }

    /// Queue-only publisher for tests and tools that run without a broker.
    /// Events are received and dropped by a logging drain.
    pub fn disconnected(origin: &str) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundEvent>();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                info!("Dropping event for {} (no broker configured)", event.topic);
            }
        });
        EventPublisher {
            tx,
            origin: origin.to_string(),
        }
    }

    pub fn publish_booking_confirmed(
        &self,
        booking: &Booking,
        items: &[BookingItem],
        billing: &BillingTransaction,
        user_id: Uuid,
    ) {
        let event = BookingConfirmedEvent {
            booking_id: booking.id,
            user_id,
            booking: serde_json::to_value(booking).unwrap_or_default(),
            items: serde_json::to_value(items).unwrap_or_default(),
            billing: serde_json::to_value(billing).unwrap_or_default(),
            emitted_by: self.origin.clone(),
            emitted_at: Utc::now(),
        };
        self.enqueue(TOPIC_BOOKING_CONFIRMED, booking.id.to_string(), &event);
    }

    pub fn publish_booking_failed(&self, booking: Option<&Booking>, user_id: Uuid, error_code: &str) {
        let event = BookingFailedEvent {
            booking_id: booking.map(|b| b.id),
            user_id,
            booking: booking.map(|b| serde_json::to_value(b).unwrap_or_default()),
            error_code: error_code.to_string(),
            emitted_by: self.origin.clone(),
            emitted_at: Utc::now(),
        };
        let key = booking
            .map(|b| b.id.to_string())
            .unwrap_or_else(|| user_id.to_string());
        self.enqueue(TOPIC_BOOKING_FAILED, key, &event);
    }

    fn enqueue<T: serde::Serialize>(&self, topic: &'static str, key: String, event: &T) {
        let payload = match serde_json::to_string(event) {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to serialize event for {}: {}", topic, e);
                return;
            }
        };
        if self.tx.send(OutboundEvent { topic, key, payload }).is_err() {
            error!("Event queue is closed; dropping event for {}", topic);
        }
    }
}

async fn drain_queue(producer: EventProducer, mut rx: mpsc::UnboundedReceiver<OutboundEvent>) {
    info!("Event publisher started");
    while let Some(event) = rx.recv().await {
        let mut backoff = Duration::from_millis(RETRY_BASE_MS);
        let mut delivered = false;
        for attempt in 1..=PUBLISH_ATTEMPTS {
            match producer.publish(event.topic, &event.key, &event.payload).await {
                Ok(()) => {
                    delivered = true;
                    break;
                }
                Err(e) => {
                    warn!(
                        "Publish attempt {}/{} for {} failed: {}",
                        attempt, PUBLISH_ATTEMPTS, event.topic, e
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
        if !delivered {
            // Workers replaying from the relational store pick up the gap.
            error!(
                "Giving up on event for {} key={} after {} attempts",
                event.topic, event.key, PUBLISH_ATTEMPTS
            );
        }
    }
}
