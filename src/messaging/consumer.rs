use std::sync::Arc;

use futures_util::StreamExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{CommitMode, Consumer, StreamConsumer},
    Message,
};

use crate::error::WorkerError;
use crate::metrics::Metrics;
use crate::models::OrderConfirmedEvent;
use crate::service::OrderProcessingService;

// ============================================================================
// Order Consumer - receives confirmation events from the order-confirmed queue
// ============================================================================
//
// The consumer owns no retry policy. A message either processes fully and its
// offset is committed, or the loop stops with the offset uncommitted and the
// restarted consumer resumes there, redelivering the message (at-least-once).
//
// Committed offsets are per-partition high-water marks, so the loop must
// never read past a failed message: committing any later offset on the same
// partition would cover the failed one.
//
// ============================================================================

pub const ORDER_CONFIRMED_QUEUE: &str = "order-confirmed-queue";

pub struct OrderConsumer {
    service: Arc<OrderProcessingService>,
    metrics: Arc<Metrics>,
}

impl OrderConsumer {
    pub fn new(service: Arc<OrderProcessingService>, metrics: Arc<Metrics>) -> Self {
        Self { service, metrics }
    }

    /// Handle one delivered message body.
    ///
    /// Every failure, parse or downstream, surfaces as
    /// `WorkerError::FailedToProcessMessage` wrapping the original cause, so
    /// the subscription loop can hand the message back to the transport.
    pub async fn on_message(&self, raw_body: &str) -> Result<(), WorkerError> {
        let event: OrderConfirmedEvent = serde_json::from_str(raw_body)
            .map_err(|e| WorkerError::FailedToProcessMessage(e.into()))?;

        self.service
            .process_order(&event.order_number)
            .await
            .map_err(WorkerError::FailedToProcessMessage)?;

        Ok(())
    }

    /// Subscribe to the order-confirmed queue and process messages until a
    /// message fails. Offsets are committed manually, only after a message
    /// has been fully processed; a failure returns from this method so the
    /// group position stays at the failed message.
    pub async fn run(&self, brokers: &str, group_id: &str) -> anyhow::Result<()> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()?;

        consumer.subscribe(&[ORDER_CONFIRMED_QUEUE])?;

        tracing::info!(
            topic = ORDER_CONFIRMED_QUEUE,
            consumer_group = %group_id,
            manual_commit = true,
            "Subscribed to order-confirmed queue"
        );

        let mut stream = consumer.stream();

        while let Some(msg_result) = stream.next().await {
            match msg_result {
                Ok(message) => {
                    self.metrics.messages_consumed.inc();

                    let Some(payload) = message.payload() else {
                        tracing::warn!(
                            offset = message.offset(),
                            "Skipping message with no payload"
                        );
                        if let Err(e) = consumer.commit_message(&message, CommitMode::Async) {
                            tracing::warn!(error = %e, "Failed to commit empty message");
                        }
                        continue;
                    };

                    let raw_body = String::from_utf8_lossy(payload);

                    match self.on_message(&raw_body).await {
                        Ok(()) => {
                            self.metrics.orders_processed.inc();

                            // Commit only after successful processing so a
                            // failure leads to redelivery.
                            if let Err(e) = consumer.commit_message(&message, CommitMode::Async) {
                                tracing::warn!(
                                    offset = message.offset(),
                                    error = %e,
                                    "Failed to commit offset (message may be redelivered)"
                                );
                            }
                        }
                        Err(e) => {
                            self.metrics.record_failure("processing_error");

                            tracing::error!(
                                offset = message.offset(),
                                error = %e,
                                cause = ?std::error::Error::source(&e),
                                "❌ Message processing failed, stopping at uncommitted offset"
                            );

                            // Do not read past the failure: a commit for any
                            // later message on this partition would also cover
                            // this offset. The restarted consumer resumes here
                            // and the message is redelivered.
                            return Err(e.into());
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to receive message from queue");
                }
            }
        }

        Ok(())
    }
}
