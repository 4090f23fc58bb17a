use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod error;
mod messaging;
mod metrics;
mod models;
mod repository;
mod service;

use config::WorkerConfig;
use messaging::{KafkaShippingPublisher, OrderConsumer};
use repository::ScyllaOrderRepository;
use service::OrderProcessingService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_worker=debug")),
        )
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(?config, "🚀 Starting order worker");

    // === 1. Create ScyllaDB Session and bootstrap the schema ===
    tracing::info!(node = %config.scylla_node, "Connecting to ScyllaDB...");
    let session: Session = SessionBuilder::new()
        .known_node(&config.scylla_node)
        .build()
        .await?;

    session
        .query_unpaged(
            format!(
                "CREATE KEYSPACE IF NOT EXISTS {} WITH REPLICATION = \
                 {{'class': 'SimpleStrategy', 'replication_factor': 1}}",
                config.keyspace
            ),
            &[],
        )
        .await?;

    session.use_keyspace(config.keyspace.as_str(), false).await?;

    let session = Arc::new(session); // Wrap for sharing

    let repository = Arc::new(ScyllaOrderRepository::new(session.clone()));
    repository.ensure_schema().await?;

    // === 2. Initialize Prometheus metrics ===
    tracing::info!("Initializing metrics");
    let metrics = Arc::new(metrics::Metrics::new()?);

    // Start metrics HTTP server in background thread
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Create the shipping publisher ===
    let publisher = Arc::new(KafkaShippingPublisher::new(
        &config.kafka_brokers,
        metrics.clone(),
    ));

    // === 4. Wire the processing engine by hand ===
    // Explicit constructor injection; collaborators are trait objects so
    // tests can substitute doubles.
    let service = Arc::new(OrderProcessingService::new(repository, publisher));

    // === 5. Run the inbound listener until shutdown ===
    let consumer = OrderConsumer::new(service, metrics);
    consumer
        .run(&config.kafka_brokers, &config.consumer_group)
        .await
}
