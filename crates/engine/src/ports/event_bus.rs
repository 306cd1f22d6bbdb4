//! Event bus port — publish/subscribe for room events.

use std::future::Future;

use roomrunner_domain::error::EngineError;
use roomrunner_domain::event::RoomEvent;

/// Publishes room events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: RoomEvent) -> impl Future<Output = Result<(), EngineError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: RoomEvent) -> impl Future<Output = Result<(), EngineError>> + Send {
        (**self).publish(event)
    }
}
