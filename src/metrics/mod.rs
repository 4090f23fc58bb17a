// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Inbound message consumption
// - Order processing outcomes
// - Shipping event publication
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the worker
pub struct Metrics {
    registry: Registry,

    pub messages_consumed: IntCounter,
    pub orders_processed: IntCounter,
    pub processing_failures: IntCounterVec,
    pub shipping_events_published: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let messages_consumed = IntCounter::new(
            "messages_consumed_total",
            "Total messages received from the order-confirmed queue",
        )?;
        registry.register(Box::new(messages_consumed.clone()))?;

        let orders_processed = IntCounter::new(
            "orders_processed_total",
            "Total orders successfully marked notified",
        )?;
        registry.register(Box::new(orders_processed.clone()))?;

        let processing_failures = IntCounterVec::new(
            Opts::new(
                "processing_failures_total",
                "Total messages whose processing failed",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(processing_failures.clone()))?;

        let shipping_events_published = IntCounter::new(
            "shipping_events_published_total",
            "Total shipping events published to the shipping queue",
        )?;
        registry.register(Box::new(shipping_events_published.clone()))?;

        Ok(Self {
            registry,
            messages_consumed,
            orders_processed,
            processing_failures,
            shipping_events_published,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a failed message processing
    pub fn record_failure(&self, reason: &str) {
        self.processing_failures.with_label_values(&[reason]).inc();
    }
}
