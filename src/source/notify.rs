//! Change notifications published by data sources.
//!
//! A [`ChangeNotifier`] multicasts [`SourceEvent`]s to every live
//! [`Subscription`]. Subscriptions deregister themselves when dropped, so a
//! controller that is torn down and rebuilt never leaves a dangling entry in
//! the notifier's registry.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A mutation announced by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceEvent {
    /// The source's total item count changed.
    TotalCountChanged {
        /// Count reported by the source after the mutation.
        new_total_count: usize,
    },
    /// Content of a page changed and any cached copy is stale.
    PageChanged {
        /// Index of the affected page.
        page_index: usize,
    },
}

type SubscriberId = u64;

#[derive(Debug, Default)]
struct Registry {
    next_id: SubscriberId,
    subscribers: Vec<(SubscriberId, UnboundedSender<SourceEvent>)>,
}

impl Registry {
    fn remove(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(candidate, _)| *candidate != id);
    }
}

/// Multicast publisher for [`SourceEvent`]s.
///
/// # Example
///
/// ```
/// use smartlist::source::{ChangeNotifier, SourceEvent};
///
/// let notifier = ChangeNotifier::new();
/// let mut subscription = notifier.subscribe();
/// notifier.publish(SourceEvent::PageChanged { page_index: 2 });
///
/// assert_eq!(
///     subscription.try_recv(),
///     Some(SourceEvent::PageChanged { page_index: 2 })
/// );
/// drop(subscription);
/// assert_eq!(notifier.subscriber_count(), 0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ChangeNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    /// Creates a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    ///
    /// Events published after this call are delivered to the returned
    /// handle until it is dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = registry.next_id;
        registry.next_id = registry.next_id.wrapping_add(1);
        registry.subscribers.push((id, sender));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            events: receiver,
        }
    }

    /// Delivers an event to every live subscriber.
    ///
    /// Subscribers whose receiving half has gone away are pruned.
    pub fn publish(&self, event: SourceEvent) {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry
            .subscribers
            .retain(|(_, sender)| sender.send(event).is_ok());
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribers
            .len()
    }
}

/// Registration handle returned by [`ChangeNotifier::subscribe`].
///
/// Dropping the handle unsubscribes it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    registry: Weak<Mutex<Registry>>,
    events: UnboundedReceiver<SourceEvent>,
}

impl Subscription {
    /// Waits for the next event.
    ///
    /// Returns `None` once the notifier has been dropped and every queued
    /// event has been consumed.
    pub async fn recv(&mut self) -> Option<SourceEvent> {
        self.events.recv().await
    }

    /// Returns a queued event without waiting.
    pub fn try_recv(&mut self) -> Option<SourceEvent> {
        self.events.try_recv().ok()
    }

    /// Releases the registration immediately.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id);
        }
    }
}
