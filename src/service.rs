use std::sync::Arc;

use anyhow::Result;

use crate::error::WorkerError;
use crate::messaging::ShippingPublisher;
use crate::models::OrderDto;
use crate::repository::OrderRepository;

// ============================================================================
// Order Processing Service
// ============================================================================
//
// Owns the single business rule of the worker:
// find order → mark notified → persist → publish shipping event.
//
// The save must complete before the publish is attempted. A crash between
// the two leaves the order notified but unshipped, which the at-least-once
// transport repairs on redelivery; the reverse (shipped but never marked
// notified) cannot happen.
//
// There is no locking per order number. Two concurrent deliveries of the
// same confirmation may both read notified=false and both publish, which is
// the documented at-least-once duplicate, not a bug.
//
// ============================================================================

pub struct OrderProcessingService {
    repository: Arc<dyn OrderRepository>,
    publisher: Arc<dyn ShippingPublisher>,
}

impl OrderProcessingService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        publisher: Arc<dyn ShippingPublisher>,
    ) -> Self {
        Self {
            repository,
            publisher,
        }
    }

    /// Mark the order as notified and emit its shipping event.
    ///
    /// A missing order is a terminal `WorkerError::OrderNotFound`; repository
    /// and publish errors propagate unchanged to the caller.
    pub async fn process_order(&self, order_number: &str) -> Result<()> {
        let mut order = self
            .repository
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| WorkerError::OrderNotFound(order_number.to_string()))?;

        // Idempotent at the flag level: a redelivered confirmation finds the
        // flag already true and writes true again.
        order.notified = true;
        self.repository.save(&order).await?;

        let payload = OrderDto::from_order(&order);
        self.publisher.publish_to_shipping_queue(&payload).await?;

        tracing::info!(
            order_number = %order.order_number,
            customer_email = %order.customer_email,
            "✅ Order marked notified and shipping event published"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::Order;

    // Shared log of collaborator calls, for asserting call order.
    type CallLog = Arc<Mutex<Vec<&'static str>>>;

    struct InMemoryOrderRepository {
        orders: Mutex<HashMap<String, Order>>,
        calls: CallLog,
    }

    impl InMemoryOrderRepository {
        fn new(calls: CallLog) -> Self {
            Self {
                orders: Mutex::new(HashMap::new()),
                calls,
            }
        }

        fn insert(&self, order: Order) {
            self.orders
                .lock()
                .unwrap()
                .insert(order.order_number.clone(), order);
        }

        fn get(&self, order_number: &str) -> Option<Order> {
            self.orders.lock().unwrap().get(order_number).cloned()
        }

        fn save_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| **c == "save")
                .count()
        }
    }

    #[async_trait]
    impl OrderRepository for InMemoryOrderRepository {
        async fn find_by_order_number(&self, order_number: &str) -> Result<Option<Order>> {
            self.calls.lock().unwrap().push("find");
            Ok(self.get(order_number))
        }

        async fn save(&self, order: &Order) -> Result<()> {
            self.calls.lock().unwrap().push("save");
            self.insert(order.clone());
            Ok(())
        }
    }

    struct RecordingPublisher {
        published: Mutex<Vec<OrderDto>>,
        calls: CallLog,
    }

    impl RecordingPublisher {
        fn new(calls: CallLog) -> Self {
            Self {
                published: Mutex::new(Vec::new()),
                calls,
            }
        }

        fn published(&self) -> Vec<OrderDto> {
            self.published.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ShippingPublisher for RecordingPublisher {
        async fn publish_to_shipping_queue(&self, payload: &OrderDto) -> Result<()> {
            self.calls.lock().unwrap().push("publish");
            self.published.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn build_service() -> (
        Arc<InMemoryOrderRepository>,
        Arc<RecordingPublisher>,
        OrderProcessingService,
        CallLog,
    ) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let repository = Arc::new(InMemoryOrderRepository::new(calls.clone()));
        let publisher = Arc::new(RecordingPublisher::new(calls.clone()));
        let service = OrderProcessingService::new(repository.clone(), publisher.clone());

        (repository, publisher, service, calls)
    }

    #[tokio::test]
    async fn test_process_order_marks_notified_and_publishes_once() {
        let (repository, publisher, service, _calls) = build_service();
        repository.insert(Order::new("1345", "teste@gmail.com", false));

        service.process_order("1345").await.unwrap();

        let stored = repository.get("1345").unwrap();
        assert!(stored.notified);

        let published = publisher.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].order_number, "1345");
        assert_eq!(published[0].customer_email, "teste@gmail.com");
    }

    #[tokio::test]
    async fn test_process_order_fails_when_order_missing() {
        let (repository, publisher, service, _calls) = build_service();

        let err = service.process_order("1345").await.unwrap_err();

        assert_eq!(err.to_string(), "Order not found: 1345");
        assert!(matches!(
            err.downcast_ref::<WorkerError>(),
            Some(WorkerError::OrderNotFound(n)) if n == "1345"
        ));

        // No partial state: nothing written, nothing published.
        assert_eq!(repository.save_count(), 0);
        assert!(publisher.published().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_delivery_keeps_flag_and_publishes_twice() {
        let (repository, publisher, service, _calls) = build_service();
        repository.insert(Order::new("1345", "teste@gmail.com", false));

        service.process_order("1345").await.unwrap();
        service.process_order("1345").await.unwrap();

        // Flag-level idempotence, with the documented duplicate publish.
        assert!(repository.get("1345").unwrap().notified);
        assert_eq!(publisher.published().len(), 2);
    }

    #[tokio::test]
    async fn test_save_happens_before_publish() {
        let (repository, _publisher, service, calls) = build_service();
        repository.insert(Order::new("1345", "teste@gmail.com", false));

        service.process_order("1345").await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec!["find", "save", "publish"]);
    }

    #[tokio::test]
    async fn test_publish_error_propagates_after_save() {
        struct FailingPublisher;

        #[async_trait]
        impl ShippingPublisher for FailingPublisher {
            async fn publish_to_shipping_queue(&self, _payload: &OrderDto) -> Result<()> {
                anyhow::bail!("broker unavailable")
            }
        }

        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let repository = Arc::new(InMemoryOrderRepository::new(calls.clone()));
        repository.insert(Order::new("1345", "teste@gmail.com", false));

        let service =
            OrderProcessingService::new(repository.clone(), Arc::new(FailingPublisher));

        let err = service.process_order("1345").await.unwrap_err();
        assert_eq!(err.to_string(), "broker unavailable");

        // The write completed before the publish was attempted, so the order
        // is notified but unshipped until the transport redelivers.
        assert!(repository.get("1345").unwrap().notified);
    }
}
