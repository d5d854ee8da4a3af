// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Event Bus Implementation - Pub/Sub for Wizard Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// The orchestrator publishes every state change here; the profile page
// publishes `LocationUpdated` so a mounted wizard can refresh its address.
//
// In-memory only: events are not replayed to late subscribers.

use crate::domain::events::WizardEvent;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Event bus for publishing and subscribing to wizard events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<WizardEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (256)
    pub fn with_default_capacity() -> Self {
        Self::new(256)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: WizardEvent) {
        debug!(event = event.name(), "Publishing wizard event");

        // send() only fails when nobody is listening
        if self.sender.send(event).is_err() {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all wizard events
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Subscribe to `LocationUpdated` events only
    pub fn subscribe_location_updates(&self) -> LocationUpdateReceiver {
        LocationUpdateReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn map_recv_error(e: broadcast::error::RecvError) -> EventBusError {
    match e {
        broadcast::error::RecvError::Closed => EventBusError::Closed,
        broadcast::error::RecvError::Lagged(n) => {
            warn!("Event receiver lagged by {} events", n);
            EventBusError::Lagged(n)
        }
    }
}

/// Receiver for all wizard events
pub struct EventReceiver {
    receiver: broadcast::Receiver<WizardEvent>,
}

impl EventReceiver {
    /// Receive the next event (waits until one is available)
    pub async fn recv(&mut self) -> Result<WizardEvent, EventBusError> {
        self.receiver.recv().await.map_err(map_recv_error)
    }

    /// Try to receive an event without waiting
    pub fn try_recv(&mut self) -> Result<WizardEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Drain every event currently buffered
    pub fn drain(&mut self) -> Vec<WizardEvent> {
        let mut events = Vec::new();
        loop {
            match self.try_recv() {
                Ok(event) => events.push(event),
                Err(EventBusError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        events
    }
}

/// Receiver that skips everything except `LocationUpdated`
pub struct LocationUpdateReceiver {
    receiver: broadcast::Receiver<WizardEvent>,
}

impl LocationUpdateReceiver {
    pub async fn recv(&mut self) -> Result<WizardEvent, EventBusError> {
        loop {
            match self.receiver.recv().await.map_err(map_recv_error) {
                Ok(event @ WizardEvent::LocationUpdated { .. }) => return Ok(event),
                Ok(_) => continue,
                // a lagged receiver may have missed an update; report one
                Err(EventBusError::Lagged(_)) => return Ok(WizardEvent::location_updated()),
                Err(e) => return Err(e),
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::ServiceCategory;
    use chrono::Utc;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        event_bus.publish(WizardEvent::CategorySelected {
            category: ServiceCategory::Handyman,
            selected_at: Utc::now(),
        });

        match receiver.recv().await.unwrap() {
            WizardEvent::CategorySelected { category, .. } => {
                assert_eq!(category, ServiceCategory::Handyman);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_location_update_filtering() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe_location_updates();

        event_bus.publish(WizardEvent::DraftCleared { cleared_at: Utc::now() });
        event_bus.publish(WizardEvent::location_updated());

        let received = receiver.recv().await.unwrap();
        assert!(matches!(received, WizardEvent::LocationUpdated { .. }));
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish(WizardEvent::DraftCleared { cleared_at: Utc::now() });

        let _ = receiver1.recv().await.unwrap();
        let _ = receiver2.recv().await.unwrap();
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let event_bus = EventBus::default();
        event_bus.publish(WizardEvent::location_updated());
        assert_eq!(event_bus.subscriber_count(), 0);
    }

    #[test]
    fn test_drain_collects_buffered() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();
        event_bus.publish(WizardEvent::location_updated());
        event_bus.publish(WizardEvent::DraftCleared { cleared_at: Utc::now() });
        assert_eq!(receiver.drain().len(), 2);
        assert!(receiver.drain().is_empty());
    }
}
