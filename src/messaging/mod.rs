pub mod consumer;
pub mod producer;

pub use consumer::OrderConsumer;
pub use producer::{KafkaShippingPublisher, ShippingPublisher};
