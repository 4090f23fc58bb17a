use std::env;

// ============================================================================
// Worker Configuration
// ============================================================================

/// Runtime configuration, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub kafka_brokers: String,
    pub scylla_node: String,
    pub keyspace: String,
    pub consumer_group: String,
    pub metrics_port: u16,
}

impl WorkerConfig {
    pub fn from_env() -> Self {
        Self {
            kafka_brokers: env_or("KAFKA_BROKERS", "127.0.0.1:9092"),
            scylla_node: env_or("SCYLLA_NODE", "127.0.0.1:9042"),
            keyspace: env_or("SCYLLA_KEYSPACE", "orders_ks"),
            consumer_group: env_or("CONSUMER_GROUP", "order-worker"),
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(9090),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
