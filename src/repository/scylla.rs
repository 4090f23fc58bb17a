use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use scylla::client::session::Session;

use super::OrderRepository;
use crate::models::Order;

// ============================================================================
// ScyllaDB Order Repository
// ============================================================================

pub struct ScyllaOrderRepository {
    session: Arc<Session>,
}

impl ScyllaOrderRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Create the orders table if it does not exist. Called once at startup,
    /// after the keyspace has been selected.
    pub async fn ensure_schema(&self) -> Result<()> {
        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS orders (
                    order_number text PRIMARY KEY,
                    customer_email text,
                    notified boolean
                )",
                &[],
            )
            .await?;

        tracing::info!("Orders table ready");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for ScyllaOrderRepository {
    async fn find_by_order_number(&self, order_number: &str) -> Result<Option<Order>> {
        let result = self
            .session
            .query_unpaged(
                "SELECT order_number, customer_email, notified \
                 FROM orders WHERE order_number = ?",
                (order_number,),
            )
            .await?;

        let rows_result = result.into_rows_result()?;
        match rows_result.maybe_first_row::<(String, String, bool)>()? {
            Some((order_number, customer_email, notified)) => Ok(Some(Order {
                order_number,
                customer_email,
                notified,
            })),
            None => Ok(None),
        }
    }

    async fn save(&self, order: &Order) -> Result<()> {
        // CQL INSERT is an upsert, which matches the save semantics here:
        // the record exists and only the notified flag changes.
        self.session
            .query_unpaged(
                "INSERT INTO orders (order_number, customer_email, notified) \
                 VALUES (?, ?, ?)",
                (&order.order_number, &order.customer_email, order.notified),
            )
            .await?;

        tracing::debug!(
            order_number = %order.order_number,
            notified = order.notified,
            "Order saved"
        );

        Ok(())
    }
}
