use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    producer::{FutureProducer, FutureRecord},
};

use crate::metrics::Metrics;
use crate::models::OrderDto;

// ============================================================================
// Shipping Producer - publishes shipping events to the shipping queue
// ============================================================================

/// Fixed outbound destination; never derived from input.
pub const SHIPPING_QUEUE: &str = "shipping-queue";

/// Outbound seam of the processing engine. Serialization and send failures
/// propagate unchanged to the caller.
#[async_trait]
pub trait ShippingPublisher: Send + Sync {
    async fn publish_to_shipping_queue(&self, payload: &OrderDto) -> Result<()>;
}

pub struct KafkaShippingPublisher {
    producer: FutureProducer,
    metrics: Arc<Metrics>,
}

impl KafkaShippingPublisher {
    pub fn new(brokers: &str, metrics: Arc<Metrics>) -> Self {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()
            .expect("Failed to create Kafka producer");

        Self { producer, metrics }
    }
}

#[async_trait]
impl ShippingPublisher for KafkaShippingPublisher {
    async fn publish_to_shipping_queue(&self, payload: &OrderDto) -> Result<()> {
        let body = serde_json::to_string(payload)?;

        // Keyed by order number so the shipping topic stays ordered per order.
        let record = FutureRecord::to(SHIPPING_QUEUE)
            .key(&payload.order_number)
            .payload(&body);

        self.producer
            .send(
                record,
                rdkafka::util::Timeout::After(std::time::Duration::from_secs(5)),
            )
            .await
            .map_err(|(e, _)| anyhow::anyhow!("Kafka send error: {}", e))?;

        self.metrics.shipping_events_published.inc();

        tracing::info!(
            topic = SHIPPING_QUEUE,
            order_number = %payload.order_number,
            "📤 Published shipping event"
        );

        Ok(())
    }
}
