use async_trait::async_trait;

use crate::models::Order;

pub mod scylla;

pub use self::scylla::ScyllaOrderRepository;

// ============================================================================
// Order Repository - persistence seam of the processing engine
// ============================================================================
//
// Only the two operations the pipeline needs. Everything else about the
// store (schema, consistency, timeouts) belongs to the implementation.
//
// ============================================================================

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_order_number(&self, order_number: &str) -> anyhow::Result<Option<Order>>;

    async fn save(&self, order: &Order) -> anyhow::Result<()>;
}
