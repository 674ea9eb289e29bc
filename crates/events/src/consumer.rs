//! Notification-side consumer of the order-placed topic.

use crate::broker::{InProcessBroker, TopicSubscription};
use crate::event::OrderPlacedEvent;
use crate::publisher::ORDER_PLACED_TOPIC;

/// Consumer group handling the notification path.
pub const NOTIFICATION_GROUP: &str = "notification";

/// Consumes order-placed events and performs the notification side effect.
///
/// Runs as its own task, fully decoupled from the request path: it sees
/// events only after the order is committed. The handler is idempotent —
/// a duplicate delivery just logs the same order number again — which is
/// exactly what the at-least-once contract requires of consumers.
pub struct NotificationConsumer {
    subscription: TopicSubscription,
}

impl NotificationConsumer {
    /// Subscribes to the order-placed topic in the notification group.
    pub fn new(broker: &InProcessBroker) -> Self {
        Self {
            subscription: broker.subscribe(ORDER_PLACED_TOPIC, NOTIFICATION_GROUP),
        }
    }

    /// Processes events until the topic is closed.
    pub async fn run(mut self) {
        tracing::info!(
            topic = ORDER_PLACED_TOPIC,
            group = NOTIFICATION_GROUP,
            "notification consumer started"
        );

        while let Some(payload) = self.subscription.recv().await {
            match serde_json::from_str::<OrderPlacedEvent>(&payload) {
                Ok(event) => {
                    metrics::counter!("notifications_received_total").increment(1);
                    // Stand-in for the real side effect (e.g. sending an email)
                    tracing::info!(
                        order_number = %event.order_number,
                        "received notification for order"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "discarding undecodable event payload");
                }
            }
        }

        tracing::info!("notification consumer stopped");
    }
}
