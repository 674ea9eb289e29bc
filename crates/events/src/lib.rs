//! Order-placed event contract for downstream consumers.
//!
//! The producer side is fire-and-forget: [`EventPublisher::publish`] hands
//! the event to the transport and returns without waiting for consumer
//! acknowledgment. Delivery is at-least-once; consumers must tolerate
//! duplicates. No ordering is guaranteed across different orders.
//!
//! [`InProcessBroker`] is the default transport: named topics over tokio
//! broadcast channels. A real message broker is deliberately out of scope;
//! the contract every transport must honor is the [`EventPublisher`] trait
//! and the topic/payload shape in [`event`].

pub mod broker;
pub mod consumer;
pub mod error;
pub mod event;
pub mod publisher;

pub use broker::{InProcessBroker, TopicSubscription};
pub use consumer::{NOTIFICATION_GROUP, NotificationConsumer};
pub use error::PublishError;
pub use event::OrderPlacedEvent;
pub use publisher::{CapturingPublisher, EventPublisher, ORDER_PLACED_TOPIC, TopicPublisher};
