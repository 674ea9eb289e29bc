//! In-process topic transport.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

const DEFAULT_TOPIC_CAPACITY: usize = 256;

/// Named-topic transport over tokio broadcast channels.
///
/// Every subscription gets its own copy of each message published after it
/// subscribed, which gives the at-least-once shape consumers must handle:
/// duplicates are possible, acknowledgments do not exist. Slow consumers
/// that fall more than the topic capacity behind lose the overwritten
/// messages and are told so.
#[derive(Clone)]
pub struct InProcessBroker {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    capacity: usize,
}

impl Default for InProcessBroker {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC_CAPACITY)
    }
}

impl InProcessBroker {
    /// Creates a broker whose topics buffer up to `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Publishes a payload to a topic, returning the number of
    /// subscriptions it was delivered to.
    ///
    /// Publishing to a topic nobody listens on is not an error; the
    /// message is simply dropped, as a broker with no bound consumer
    /// group would eventually discard it.
    pub fn publish(&self, topic: &str, payload: String) -> usize {
        let sender = self.sender(topic);
        match sender.send(payload) {
            Ok(receivers) => receivers,
            Err(_) => 0,
        }
    }

    /// Creates a subscription on a topic for the given consumer group
    /// member. Only messages published after this call are delivered.
    pub fn subscribe(&self, topic: &str, group: &str) -> TopicSubscription {
        let receiver = self.sender(topic).subscribe();
        TopicSubscription {
            topic: topic.to_string(),
            group: group.to_string(),
            receiver,
        }
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<String> {
        {
            let topics = self.topics.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(sender) = topics.get(topic) {
                return sender.clone();
            }
        }

        let mut topics = self.topics.write().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

/// One consumer group member's view of a topic.
pub struct TopicSubscription {
    topic: String,
    group: String,
    receiver: broadcast::Receiver<String>,
}

impl TopicSubscription {
    /// The topic this subscription listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The consumer group this subscription belongs to.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Waits for the next payload.
    ///
    /// Returns `None` once the topic is gone and no buffered messages
    /// remain. Messages lost to a lagging consumer are skipped with a
    /// warning; the next available payload is returned instead.
    pub async fn recv(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    metrics::counter!("events_dropped_total", "topic" => self.topic.clone())
                        .increment(missed);
                    tracing::warn!(
                        topic = %self.topic,
                        group = %self.group,
                        missed,
                        "subscription lagged, messages lost"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_subscription() {
        let broker = InProcessBroker::default();
        let mut sub = broker.subscribe("order-placed", "notification");

        let delivered = broker.publish("order-placed", "payload-1".to_string());

        assert_eq!(delivered, 1);
        assert_eq!(sub.recv().await.as_deref(), Some("payload-1"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_dropped_silently() {
        let broker = InProcessBroker::default();
        assert_eq!(broker.publish("order-placed", "payload".to_string()), 0);
    }

    #[tokio::test]
    async fn each_group_receives_its_own_copy() {
        let broker = InProcessBroker::default();
        let mut notification = broker.subscribe("order-placed", "notification");
        let mut analytics = broker.subscribe("order-placed", "analytics");

        broker.publish("order-placed", "payload".to_string());

        assert_eq!(notification.recv().await.as_deref(), Some("payload"));
        assert_eq!(analytics.recv().await.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn duplicate_publishes_produce_duplicate_deliveries() {
        let broker = InProcessBroker::default();
        let mut sub = broker.subscribe("order-placed", "notification");

        broker.publish("order-placed", "same".to_string());
        broker.publish("order-placed", "same".to_string());

        assert_eq!(sub.recv().await.as_deref(), Some("same"));
        assert_eq!(sub.recv().await.as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn recv_ends_when_broker_is_dropped() {
        let broker = InProcessBroker::default();
        let mut sub = broker.subscribe("order-placed", "notification");
        drop(broker);

        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn topics_are_isolated() {
        let broker = InProcessBroker::default();
        let mut sub = broker.subscribe("order-placed", "notification");

        broker.publish("another-topic", "other".to_string());
        broker.publish("order-placed", "mine".to_string());

        assert_eq!(sub.recv().await.as_deref(), Some("mine"));
    }
}
