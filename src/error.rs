// ============================================================================
// Worker Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Raised at the message boundary for any parse or downstream failure.
    /// The fixed message is the contract the queue transport keys its
    /// redelivery/dead-letter policy on; the cause stays retrievable via
    /// `source()`.
    #[error("Failed to process message")]
    FailedToProcessMessage(#[source] anyhow::Error),

    /// The confirmation referenced an order number with no matching record.
    /// Terminal for that message; nothing was written or published.
    #[error("Order not found: {0}")]
    OrderNotFound(String),
}
