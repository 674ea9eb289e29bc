//! Event publisher trait and implementations.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::broker::InProcessBroker;
use crate::error::PublishError;
use crate::event::OrderPlacedEvent;

/// Topic carrying order-placed announcements.
pub const ORDER_PLACED_TOPIC: &str = "order-placed";

/// Fire-and-forget producer side of the order-placed contract.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hands the event to the transport and returns without waiting for
    /// any consumer. Returning `Ok` means the transport accepted the
    /// message, not that anyone processed it.
    async fn publish(&self, event: &OrderPlacedEvent) -> Result<(), PublishError>;
}

/// Publishes order-placed events onto a broker topic as JSON.
#[derive(Clone)]
pub struct TopicPublisher {
    broker: InProcessBroker,
    topic: String,
}

impl TopicPublisher {
    /// Creates a publisher on the standard order-placed topic.
    pub fn new(broker: InProcessBroker) -> Self {
        Self::with_topic(broker, ORDER_PLACED_TOPIC)
    }

    /// Creates a publisher on a custom topic.
    pub fn with_topic(broker: InProcessBroker, topic: impl Into<String>) -> Self {
        Self {
            broker,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl EventPublisher for TopicPublisher {
    async fn publish(&self, event: &OrderPlacedEvent) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        let delivered = self.broker.publish(&self.topic, payload);

        metrics::counter!("events_published_total", "topic" => self.topic.clone()).increment(1);
        tracing::debug!(
            topic = %self.topic,
            order_number = %event.order_number,
            delivered,
            "order-placed event published"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CapturingState {
    events: Vec<OrderPlacedEvent>,
    fail_on_publish: bool,
}

/// Capturing publisher for tests: records every published event and can be
/// switched to reject publishes.
#[derive(Debug, Clone, Default)]
pub struct CapturingPublisher {
    state: Arc<RwLock<CapturingState>>,
}

impl CapturingPublisher {
    /// Creates a new capturing publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to fail on subsequent publish calls.
    pub async fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().await.fail_on_publish = fail;
    }

    /// Returns all captured events in publish order.
    pub async fn published(&self) -> Vec<OrderPlacedEvent> {
        self.state.read().await.events.clone()
    }

    /// Returns the number of captured events.
    pub async fn publish_count(&self) -> usize {
        self.state.read().await.events.len()
    }
}

#[async_trait]
impl EventPublisher for CapturingPublisher {
    async fn publish(&self, event: &OrderPlacedEvent) -> Result<(), PublishError> {
        let mut state = self.state.write().await;

        if state.fail_on_publish {
            return Err(PublishError::Transport {
                topic: ORDER_PLACED_TOPIC.to_string(),
                reason: "transport rejected the event".to_string(),
            });
        }

        state.events.push(event.clone());
        Ok(())
    }
}
